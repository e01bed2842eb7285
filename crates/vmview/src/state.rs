//! Application state shared across HTTP handlers

use std::sync::Arc;

use vmview_inventory::InventoryAggregator;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Aggregation engine behind every VM route
    pub inventory: Arc<InventoryAggregator>,
}

impl AppState {
    /// Create new application state
    pub fn new(inventory: InventoryAggregator) -> Self {
        Self {
            inventory: Arc::new(inventory),
        }
    }
}
