//! Ordering and page slicing for list queries.

use std::cmp::Ordering;

use serde::Serialize;

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::error::{PlayerError, Result};
use crate::types::{Player, PlayerOrder, PlayerQuery};

impl PlayerOrder {
    /// Ascending comparison on this sort key.
    pub fn compare(self, a: &Player, b: &Player) -> Ordering {
        match self {
            PlayerOrder::Id => a.id.cmp(&b.id),
            PlayerOrder::Name => a.name.cmp(&b.name),
            PlayerOrder::Experience => a.experience.cmp(&b.experience),
            PlayerOrder::Birthday => a.birthday.cmp(&b.birthday),
            PlayerOrder::Level => a.level.cmp(&b.level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub order: PlayerOrder,
    pub page_number: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            order: PlayerOrder::Id,
            page_number: DEFAULT_PAGE_NUMBER as usize,
            page_size: DEFAULT_PAGE_SIZE as usize,
        }
    }
}

impl PageRequest {
    /// Rejects negative page numbers and page sizes below one.
    pub fn new(order: PlayerOrder, page_number: i32, page_size: i32) -> Result<Self> {
        if page_number < 0 {
            return Err(PlayerError::invalid(format!(
                "page number {page_number} is negative"
            )));
        }
        if page_size < 1 {
            return Err(PlayerError::invalid(format!(
                "page size {page_size} must be at least 1"
            )));
        }
        Ok(Self {
            order,
            page_number: page_number as usize,
            page_size: page_size as usize,
        })
    }

    pub fn from_query(query: &PlayerQuery) -> Result<Self> {
        Self::new(
            query.order.unwrap_or_default(),
            query.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// Index of the first element on this page.
    pub fn offset(&self) -> usize {
        self.page_number.saturating_mul(self.page_size)
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
}

/// Sorts `players` by the requested key (ties by id) and cuts out one page.
pub fn paginate(mut players: Vec<Player>, request: &PageRequest) -> Page<Player> {
    players.sort_by(|a, b| request.order.compare(a, b).then_with(|| a.id.cmp(&b.id)));

    let total_elements = players.len() as u64;
    let content = players
        .into_iter()
        .skip(request.offset())
        .take(request.page_size)
        .collect();

    Page {
        content,
        total_elements,
    }
}
