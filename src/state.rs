//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::db::service::ActionPlanStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Stored-procedure gateway for action plans
    pub action_plans: Arc<dyn ActionPlanStore>,
}

impl AppState {
    pub fn new(action_plans: Arc<dyn ActionPlanStore>) -> Self {
        Self { action_plans }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
