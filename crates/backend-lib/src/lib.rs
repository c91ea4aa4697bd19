// ============================
// coderoom-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the coderoom relay server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod room;
pub mod transport;
pub mod validation;
pub mod ws_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::room::RoomCoordinator;
use crate::transport::Transport;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<T: Transport + Clone> {
    /// Room coordinator, sole owner of the membership table and content cache
    pub coordinator: Arc<RoomCoordinator<T>>,
    /// Transport collaborator (connection registry + room grouping)
    pub transport: T,
    /// Settings manager
    pub settings: Arc<Settings>,
}

impl<T: Transport + Clone> AppState<T> {
    /// Create a new application state
    pub fn new(transport: T, settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let coordinator = Arc::new(RoomCoordinator::new(
            transport.clone(),
            settings.join_policy,
        ));

        Self {
            coordinator,
            transport,
            settings,
        }
    }
}
