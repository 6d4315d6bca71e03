use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::PlayerError;
use crate::types::{Profession, Race};

/// Reads an optional query value, treating an empty string like a missing one.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Body of `POST /rest/players`.
///
/// Every field is optional on the wire so that a missing field can be reported
/// as invalid input instead of a deserialization failure. Client-supplied `id`,
/// `level` and `untilNextLevel` are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub birthday: Option<i64>,
    pub banned: Option<bool>,
    pub experience: Option<i32>,
}

/// Body of `POST /rest/players/{id}`. Only the present fields are applied.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    pub birthday: Option<i64>,
    pub banned: Option<bool>,
    pub experience: Option<i32>,
}

impl PlayerPatch {
    /// True when the patch carries no settable field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.race.is_none()
            && self.profession.is_none()
            && self.birthday.is_none()
            && self.banned.is_none()
            && self.experience.is_none()
    }
}

/// Sort keys accepted by the list endpoint.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerOrder {
    #[default]
    Id,
    Name,
    Experience,
    Birthday,
    Level,
}

impl PlayerOrder {
    pub fn field_name(self) -> &'static str {
        match self {
            PlayerOrder::Id => "id",
            PlayerOrder::Name => "name",
            PlayerOrder::Experience => "experience",
            PlayerOrder::Birthday => "birthday",
            PlayerOrder::Level => "level",
        }
    }
}

impl FromStr for PlayerOrder {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID" => Ok(PlayerOrder::Id),
            "NAME" => Ok(PlayerOrder::Name),
            "EXPERIENCE" => Ok(PlayerOrder::Experience),
            "BIRTHDAY" => Ok(PlayerOrder::Birthday),
            "LEVEL" => Ok(PlayerOrder::Level),
            _ => Err(PlayerError::invalid(format!("unknown order {s:?}"))),
        }
    }
}

/// Query string of `GET /rest/players` and `GET /rest/players/count`.
///
/// The paging fields are ignored by the count endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub race: Option<Race>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profession: Option<Profession>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub after: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub before: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub banned: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_experience: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_experience: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_level: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_level: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<PlayerOrder>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_number: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i32>,
}
