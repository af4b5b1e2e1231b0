//! Web server module
//!
//! Exposes the pass-through search proxy and a health endpoint.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
