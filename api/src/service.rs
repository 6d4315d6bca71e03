//! Player operations: rules from `players_core` applied around a repository.
//!
//! Every check runs before the repository is asked to write, so a rejected
//! request never leaves a partial update behind.

use log::debug;
use players_core::rules::{parse_id, validate_new};
use players_core::{NewPlayer, PageRequest, Player, PlayerError, PlayerFilter, PlayerPatch, PlayerQuery};

use crate::errors::Result;
use crate::repository::PlayerRepository;

/// One page of players matching the query's filters.
pub async fn list_players(repo: &dyn PlayerRepository, query: &PlayerQuery) -> Result<Vec<Player>> {
    let filter = PlayerFilter::from(query);
    let page = PageRequest::from_query(query)?;
    debug!(
        "Listing players: filter={:?}, order={}, page={}, size={}",
        filter,
        page.order.field_name(),
        page.page_number,
        page.page_size
    );

    let page = repo.find_all_matching(&filter, &page).await?;
    debug!(
        "Returning {} of {} matching players",
        page.content.len(),
        page.total_elements
    );
    Ok(page.content)
}

/// Number of players matching the query's filters. Paging fields are ignored.
pub async fn count_players(repo: &dyn PlayerRepository, query: &PlayerQuery) -> Result<u64> {
    let filter = PlayerFilter::from(query);
    debug!("Counting players: filter={:?}", filter);
    Ok(repo.count_matching(&filter).await?)
}

pub async fn create_player(repo: &dyn PlayerRepository, payload: NewPlayer) -> Result<Player> {
    let player = validate_new(payload)?;
    Ok(repo.save(player).await?)
}

pub async fn get_player(repo: &dyn PlayerRepository, raw_id: &str) -> Result<Player> {
    let id = parse_id(raw_id)?;
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| PlayerError::NotFound(id).into())
}

/// Applies a partial update.
///
/// A patch without any field returns the stored record untouched. Otherwise
/// the present fields are validated, applied, and the record is written back
/// with its level re-derived. A record deleted in the meantime stays deleted
/// and the update reports it as not found.
pub async fn update_player(
    repo: &dyn PlayerRepository,
    raw_id: &str,
    patch: PlayerPatch,
) -> Result<Player> {
    let id = parse_id(raw_id)?;
    let mut player = repo
        .find_by_id(id)
        .await?
        .ok_or(PlayerError::NotFound(id))?;

    if patch.is_empty() {
        debug!("Update of player {} carries no fields; returning stored record", id);
        return Ok(player);
    }

    patch.validate()?;
    patch.apply_to(&mut player);
    repo.update(player)
        .await?
        .ok_or_else(|| PlayerError::NotFound(id).into())
}

pub async fn delete_player(repo: &dyn PlayerRepository, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id)?;
    if !repo.exists_by_id(id).await? {
        return Err(PlayerError::NotFound(id).into());
    }
    Ok(repo.delete_by_id(id).await?)
}
