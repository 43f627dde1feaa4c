//! Courier Web Library
//!
//! Server-rendered pages for the login handshake and the federated upload form.
//! All authorization state travels in the browser's cookies.

mod handlers;
mod middleware;
mod telemetry;
mod templates;

// Public modules
pub mod cookies;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
