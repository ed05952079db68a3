pub mod config;
pub mod handlers;
pub mod metrics;

pub use config::AppConfig;
pub use handlers::{AppState, create_router};
pub use metrics::Metrics;
