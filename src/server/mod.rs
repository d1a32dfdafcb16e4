mod error;
mod routes;
mod server;
mod state;
pub mod types;

pub use server::{build_router, ApiServer};
pub use state::AppState;
