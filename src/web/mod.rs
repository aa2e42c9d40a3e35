//! HTTP surface for feedbeat.

pub mod router;
pub mod server;

pub use router::{create_router, AppState};
pub use server::WebServer;
