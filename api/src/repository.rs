//! Storage contract for player records and the in-memory backend.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use players_core::{Page, PageRequest, Player, PlayerFilter, paginate};

use crate::errors::RepositoryError;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistence operations the player service relies on.
///
/// Implementations are shared between requests as `Arc<dyn PlayerRepository>`.
/// A single `save`, `update` or `delete_by_id` must be atomic for its record.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Player>>;

    async fn exists_by_id(&self, id: i64) -> Result<bool>;

    /// Stores `player`, allocating an id first when it has none.
    async fn save(&self, player: Player) -> Result<Player>;

    /// Overwrites an existing record. Returns `None`, writing nothing, when
    /// the record is gone or `player` has no id.
    async fn update(&self, player: Player) -> Result<Option<Player>>;

    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Players matching `filter`, sorted and cut down to the requested page.
    async fn find_all_matching(
        &self,
        filter: &PlayerFilter,
        page: &PageRequest,
    ) -> Result<Page<Player>>;

    async fn count_matching(&self, filter: &PlayerFilter) -> Result<u64>;
}

/// Process-local player store. Not persistent across restarts.
pub struct InMemoryPlayerRepository {
    players: RwLock<BTreeMap<i64, Player>>,
    next_id: AtomicI64,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn snapshot_matching(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players
            .values()
            .filter(|player| filter.matches(player))
            .cloned()
            .collect())
    }
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.contains_key(&id))
    }

    async fn save(&self, mut player: Player) -> Result<Player> {
        let id = match player.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        player.id = Some(id);

        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players.insert(id, player.clone());
        Ok(player)
    }

    async fn update(&self, player: Player) -> Result<Option<Player>> {
        let Some(id) = player.id else {
            return Ok(None);
        };

        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        match players.get_mut(&id) {
            Some(stored) => {
                *stored = player.clone();
                Ok(Some(player))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players.remove(&id);
        Ok(())
    }

    async fn find_all_matching(
        &self,
        filter: &PlayerFilter,
        page: &PageRequest,
    ) -> Result<Page<Player>> {
        let matching = self.snapshot_matching(filter)?;
        Ok(paginate(matching, page))
    }

    async fn count_matching(&self, filter: &PlayerFilter) -> Result<u64> {
        Ok(self.snapshot_matching(filter)?.len() as u64)
    }
}
