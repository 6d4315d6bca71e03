use std::sync::Arc;

use crate::repository::PlayerRepository;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn PlayerRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn PlayerRepository>) -> Self {
        Self { repository }
    }
}
