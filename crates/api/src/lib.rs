//! HTTP surface for the MSDS knowledge-graph pipeline: upload and validate,
//! extract, visualize, approve into a graph store, export RDF, chat.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod retry;
pub mod routes;
pub mod session;
pub mod state;

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
