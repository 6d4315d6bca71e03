//! KeyDB-backed player repository.
//!
//! Key schema:
//! - `player:next_id` — counter used to allocate ids with `INCR`
//! - `player:{id}`    — hash holding one player record
//! - `players`        — set of every stored id
//!
//! Writes touching more than one key run as atomic pipelines.

use std::collections::HashMap;

use async_trait::async_trait;
use log::error;
use players_core::{Page, PageRequest, Player, PlayerFilter, paginate};
use redis::AsyncCommands;

use crate::errors::RepositoryError;
use crate::repository::{PlayerRepository, Result};

const NEXT_ID_KEY: &str = "player:next_id";
const PLAYERS_KEY: &str = "players";

/// Rewrites `KEYS[1]` with the field/value pairs in `ARGV`, only if it exists.
const UPDATE_IF_EXISTS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
"#;

fn player_key(id: i64) -> String {
    format!("player:{}", id)
}

/// Flattens a player into `(field, value)` pairs for `HSET`.
fn encode_player(player: &Player) -> Vec<(&'static str, String)> {
    vec![
        ("name", player.name.clone()),
        ("title", player.title.clone()),
        ("race", player.race.as_str().to_string()),
        ("profession", player.profession.as_str().to_string()),
        ("birthday", player.birthday.to_string()),
        ("banned", player.banned.to_string()),
        ("experience", player.experience.to_string()),
        ("level", player.level.to_string()),
        ("until_next_level", player.until_next_level.to_string()),
    ]
}

fn field<'a>(key: &str, fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| RepositoryError::CorruptedRecord {
            key: key.to_string(),
            reason: format!("missing field {}", name),
        })
}

fn parse_field<T: std::str::FromStr>(
    key: &str,
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<T> {
    let raw = field(key, fields, name)?;
    raw.parse().map_err(|_| RepositoryError::CorruptedRecord {
        key: key.to_string(),
        reason: format!("bad value {:?} for {}", raw, name),
    })
}

/// Rebuilds a player from the fields returned by `HGETALL player:{id}`.
fn decode_player(id: i64, fields: &HashMap<String, String>) -> Result<Player> {
    let key = player_key(id);
    Ok(Player {
        id: Some(id),
        name: field(&key, fields, "name")?.to_string(),
        title: field(&key, fields, "title")?.to_string(),
        race: parse_field(&key, fields, "race")?,
        profession: parse_field(&key, fields, "profession")?,
        birthday: parse_field(&key, fields, "birthday")?,
        banned: parse_field(&key, fields, "banned")?,
        experience: parse_field(&key, fields, "experience")?,
        level: parse_field(&key, fields, "level")?,
        until_next_level: parse_field(&key, fields, "until_next_level")?,
    })
}

pub struct KeyDbPlayerRepository {
    con: redis::aio::MultiplexedConnection,
}

impl KeyDbPlayerRepository {
    pub fn new(con: redis::aio::MultiplexedConnection) -> Self {
        Self { con }
    }

    /// Loads every stored player matching `filter`.
    ///
    /// Ids come from the `players` set and the hashes are fetched in a single
    /// pipeline round-trip. Ids whose hash has vanished are skipped.
    async fn load_matching(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        let mut con = self.con.clone();

        let ids: Vec<i64> = con.smembers(PLAYERS_KEY).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.cmd("HGETALL").arg(player_key(*id));
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut con).await?;

        let mut players = Vec::with_capacity(ids.len());
        for (id, fields) in ids.into_iter().zip(hashes) {
            if fields.is_empty() {
                continue;
            }
            let player = decode_player(id, &fields).inspect_err(|err| {
                error!("Failed to decode player {}: {}", id, err);
            })?;
            if filter.matches(&player) {
                players.push(player);
            }
        }
        Ok(players)
    }
}

#[async_trait]
impl PlayerRepository for KeyDbPlayerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Player>> {
        let mut con = self.con.clone();
        let fields: HashMap<String, String> = con.hgetall(player_key(id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        decode_player(id, &fields).map(Some)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let mut con = self.con.clone();
        let exists: bool = con.exists(player_key(id)).await?;
        Ok(exists)
    }

    async fn save(&self, mut player: Player) -> Result<Player> {
        let mut con = self.con.clone();

        let id = match player.id {
            Some(id) => id,
            None => con.incr(NEXT_ID_KEY, 1).await?,
        };
        player.id = Some(id);
        let key = player_key(id);

        let mut pipe = redis::pipe();
        pipe.atomic().cmd("HSET").arg(&key);
        for (name, value) in encode_player(&player) {
            pipe.arg(name).arg(value);
        }
        pipe.cmd("SADD").arg(PLAYERS_KEY).arg(id);

        pipe.query_async(&mut con)
            .await
            .map(|_: Vec<redis::Value>| player)
            .map_err(RepositoryError::from)
    }

    /// The existence check and the write run as one server-side script.
    async fn update(&self, player: Player) -> Result<Option<Player>> {
        let Some(id) = player.id else {
            return Ok(None);
        };
        let mut con = self.con.clone();

        let script = redis::Script::new(UPDATE_IF_EXISTS);
        let mut invocation = script.key(player_key(id));
        for (name, value) in encode_player(&player) {
            invocation.arg(name).arg(value);
        }
        let written: i32 = invocation.invoke_async(&mut con).await?;

        Ok((written == 1).then_some(player))
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut con = self.con.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("DEL")
            .arg(player_key(id))
            .cmd("SREM")
            .arg(PLAYERS_KEY)
            .arg(id);

        pipe.query_async(&mut con)
            .await
            .map(|_: Vec<redis::Value>| ())
            .map_err(RepositoryError::from)
    }

    async fn find_all_matching(
        &self,
        filter: &PlayerFilter,
        page: &PageRequest,
    ) -> Result<Page<Player>> {
        let players = self.load_matching(filter).await?;
        Ok(paginate(players, page))
    }

    async fn count_matching(&self, filter: &PlayerFilter) -> Result<u64> {
        Ok(self.load_matching(filter).await?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use players_core::{Profession, Race};

    fn sample() -> Player {
        Player {
            id: Some(12),
            name: "Brannoc".to_string(),
            title: "Keeper of Tallow".to_string(),
            race: Race::Giant,
            profession: Profession::Warlock,
            birthday: 1_244_505_600_000,
            banned: true,
            experience: 300,
            level: 2,
            until_next_level: 300,
        }
    }

    fn as_hash(player: &Player) -> HashMap<String, String> {
        encode_player(player)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn hash_fields_restore_the_player() {
        let player = sample();
        assert_eq!(decode_player(12, &as_hash(&player)).unwrap(), player);
    }

    #[test]
    fn missing_field_is_reported() {
        let mut fields = as_hash(&sample());
        fields.remove("profession");

        match decode_player(12, &fields) {
            Err(RepositoryError::CorruptedRecord { key, reason }) => {
                assert_eq!(key, "player:12");
                assert!(reason.contains("profession"));
            }
            other => panic!("expected corrupted record, got {:?}", other),
        }
    }

    #[test]
    fn unparsable_field_is_reported() {
        let mut fields = as_hash(&sample());
        fields.insert("race".to_string(), "CENTAUR".to_string());
        assert!(matches!(
            decode_player(12, &fields),
            Err(RepositoryError::CorruptedRecord { .. })
        ));
    }
}
