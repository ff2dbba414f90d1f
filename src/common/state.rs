use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::access::OwnershipPolicy;
use crate::common::clock::{Clock, SystemClock};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    // Arc because `DatabaseConnection` is not `Clone` when the sea-orm
    // `mock` feature is enabled (as it is for tests).
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DatabaseConnection, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            clock,
        }
    }

    /// Ownership policy for object-level checks, derived from config.
    #[must_use]
    pub fn ownership_policy(&self) -> OwnershipPolicy {
        if self.config.ownership_hide_existence {
            OwnershipPolicy::HideExistence
        } else {
            OwnershipPolicy::RevealExistence
        }
    }
}
