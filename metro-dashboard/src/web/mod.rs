//! Web layer for the metro trip dashboard.
//!
//! Serves the dashboard page and JSON endpoints for filtering trips and
//! drawing routes.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
pub use templates::*;
