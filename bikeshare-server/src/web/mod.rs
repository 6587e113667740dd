//! Web layer for the bike share server.
//!
//! Exposes the challenge and availability queries of every registered
//! deployment over HTTP, plus diagnostics and a manual refresh.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
