//! HTTP routes.

pub mod health;
pub mod session;

pub use health::{HealthResponse, health_routes};
pub use session::{
    StatsResponse, delete_data_handler, delete_session_handler, get_session_handler,
    put_data_handler, stats_handler,
};
