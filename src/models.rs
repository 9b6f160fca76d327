//! Data models and DTOs (Data Transfer Objects)
//!
//! Action plans themselves stay as opaque `serde_json::Value`s; the only shaped
//! payloads are the confirmation envelopes.

use serde::Serialize;

pub const ACTION_PLAN_ADDED: &str = "Plan de accion agregado!";
pub const ACTION_PLAN_ADDED_WITH_DETAIL: &str = "Plan de accion agregado Detallado!";
pub const ACTION_PLAN_EDITED: &str = "Plan de accion editado!";

/// Message-only response (no data)
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
