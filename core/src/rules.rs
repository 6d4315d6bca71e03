//! Validation and derivation rules applied to player payloads before storage.

use chrono::{DateTime, Datelike, Utc};

use crate::constants::{
    BIRTHDAY_YEAR_MAX, BIRTHDAY_YEAR_MIN, EXPERIENCE_MAX, EXPERIENCE_MIN, NAME_MAX_LEN,
    NAME_MIN_LEN, TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use crate::error::{PlayerError, Result};
use crate::levels;
use crate::types::{NewPlayer, Player, PlayerPatch};

/// Parses a path identifier. Only strictly positive integers are accepted.
pub fn parse_id(raw: &str) -> Result<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(PlayerError::invalid(format!("invalid player id {raw:?}"))),
    }
}

/// Lengths are counted in UTF-16 code units, so characters outside the
/// Basic Multilingual Plane count twice.
fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn check_name(name: &str) -> Result<()> {
    let len = text_len(name);
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(PlayerError::invalid(format!(
            "name must be {NAME_MIN_LEN}..={NAME_MAX_LEN} characters, got {len}"
        )))
    }
}

fn check_title(title: &str) -> Result<()> {
    let len = text_len(title);
    if (TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(PlayerError::invalid(format!(
            "title must be {TITLE_MIN_LEN}..={TITLE_MAX_LEN} characters, got {len}"
        )))
    }
}

fn check_experience(experience: i32) -> Result<()> {
    if (EXPERIENCE_MIN..=EXPERIENCE_MAX).contains(&experience) {
        Ok(())
    } else {
        Err(PlayerError::invalid(format!(
            "experience {experience} outside {EXPERIENCE_MIN}..={EXPERIENCE_MAX}"
        )))
    }
}

/// Calendar year (UTC) of an epoch-millisecond timestamp.
pub fn birthday_year(birthday: i64) -> Option<i32> {
    DateTime::<Utc>::from_timestamp_millis(birthday).map(|date| date.year())
}

fn check_birthday_year(birthday: i64) -> Result<()> {
    match birthday_year(birthday) {
        Some(year) if (BIRTHDAY_YEAR_MIN..=BIRTHDAY_YEAR_MAX).contains(&year) => Ok(()),
        Some(year) => Err(PlayerError::invalid(format!(
            "birthday year {year} outside {BIRTHDAY_YEAR_MIN}..={BIRTHDAY_YEAR_MAX}"
        ))),
        None => Err(PlayerError::invalid(format!(
            "birthday {birthday} is not a representable date"
        ))),
    }
}

fn missing(field: &str) -> PlayerError {
    PlayerError::invalid(format!("{field} is required"))
}

/// Validates a create payload and turns it into an unsaved player.
///
/// All of name, title, race, profession, birthday and experience must be
/// present and in range. `banned` defaults to `false`. The returned player has
/// no id and carries freshly derived level fields.
pub fn validate_new(payload: NewPlayer) -> Result<Player> {
    let name = payload.name.ok_or_else(|| missing("name"))?;
    let title = payload.title.ok_or_else(|| missing("title"))?;
    let race = payload.race.ok_or_else(|| missing("race"))?;
    let profession = payload.profession.ok_or_else(|| missing("profession"))?;
    let birthday = payload.birthday.ok_or_else(|| missing("birthday"))?;
    let experience = payload.experience.ok_or_else(|| missing("experience"))?;

    check_name(&name)?;
    check_title(&title)?;
    check_experience(experience)?;
    if birthday < 0 {
        return Err(PlayerError::invalid(format!(
            "birthday {birthday} is before the epoch"
        )));
    }
    check_birthday_year(birthday)?;

    let (level, until_next_level) = levels::derive(experience);

    Ok(Player {
        id: None,
        name,
        title,
        race,
        profession,
        birthday,
        banned: payload.banned.unwrap_or(false),
        experience,
        level,
        until_next_level,
    })
}

impl PlayerPatch {
    /// Checks the fields that are present. Absent fields are not validated.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(experience) = self.experience {
            check_experience(experience)?;
        }
        if let Some(birthday) = self.birthday {
            check_birthday_year(birthday)?;
        }
        Ok(())
    }

    /// Writes the present fields onto `player` and re-derives its level.
    ///
    /// An absent `banned` clears the flag instead of leaving it untouched.
    pub fn apply_to(self, player: &mut Player) {
        if let Some(name) = self.name {
            player.name = name;
        }
        if let Some(title) = self.title {
            player.title = title;
        }
        if let Some(race) = self.race {
            player.race = race;
        }
        if let Some(profession) = self.profession {
            player.profession = profession;
        }
        if let Some(experience) = self.experience {
            player.experience = experience;
        }
        if let Some(birthday) = self.birthday {
            player.birthday = birthday;
        }
        player.banned = self.banned.unwrap_or(false);

        let (level, until_next_level) = levels::derive(player.experience);
        player.level = level;
        player.until_next_level = until_next_level;
    }
}
