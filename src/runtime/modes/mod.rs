//! Mode routing
//!
//! - `serve`: HTTP server
//! - `generate-config`: write a sample configuration file

pub mod config_gen;
pub mod server;

pub use config_gen::generate_config;
pub use server::run_server;
