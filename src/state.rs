//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the layout service (both persistence tiers) and the floor
//! managers of every facility touched since start-up, keyed by resolved
//! facility id. Managers are hydrated lazily on first request. The map lock
//! only guards lookups; each manager carries its own lock for the duration
//! of a floor operation.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::floor::FacilityMap;
use crate::services::layout::LayoutService;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub layouts: Arc<LayoutService>,
    pub facilities: Arc<FacilityMap>,
}

impl AppState {
    #[must_use]
    pub fn new(layouts: LayoutService) -> Self {
        Self { layouts: Arc::new(layouts), facilities: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
