pub mod appointments;
pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod organizations;
pub mod profile;
pub mod routes;
pub mod types;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{
    api_result, error_from_slotbook, error_response, json_config, path_config, query_config,
    success_response,
};
pub use routes::api_routes;
pub use types::*;
