//! HTTP JSON API over a lingvo content directory.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, WebError};
pub use server::{build_router, start_server};
pub use state::AppState;
