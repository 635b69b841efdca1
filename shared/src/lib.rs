//! Shared types for the ordering backend
//!
//! Common types used by the order server and its clients: unified error
//! codes, domain models, and the typed chat intent payload.

pub mod error;
pub mod intent;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use intent::{Intent, IntentKind, IntentPayload};
