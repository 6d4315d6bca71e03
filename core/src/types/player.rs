use serde::{Deserialize, Serialize};

use crate::types::{Profession, Race};

/// A persisted player record as exchanged with clients and storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Identity assigned by storage; `None` until the record is first saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub name: String,

    pub title: String,

    pub race: Race,

    pub profession: Profession,

    /// Epoch milliseconds
    pub birthday: i64,

    pub banned: bool,

    pub experience: i32,

    /// Derived from `experience`, see `levels::level_for_experience`.
    pub level: i32,

    /// Derived from `experience` and `level`.
    pub until_next_level: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_fields() {
        let player = Player {
            id: Some(7),
            name: "Ezekiel".to_string(),
            title: "Knight of the Hollow".to_string(),
            race: Race::Human,
            profession: Profession::Paladin,
            birthday: 1_244_505_600_000,
            banned: false,
            experience: 100,
            level: 1,
            until_next_level: 200,
        };

        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["race"], "HUMAN");
        assert_eq!(value["profession"], "PALADIN");
        assert_eq!(value["untilNextLevel"], 200);
        assert_eq!(value["birthday"], 1_244_505_600_000i64);
    }

    #[test]
    fn unsaved_player_omits_id() {
        let player = Player {
            id: None,
            name: "Nim".to_string(),
            title: "Apprentice".to_string(),
            race: Race::Hobbit,
            profession: Profession::Rogue,
            birthday: 1_000_000_000_000,
            banned: true,
            experience: 0,
            level: 0,
            until_next_level: 100,
        };

        let value = serde_json::to_value(&player).unwrap();
        assert!(value.get("id").is_none());
    }
}
