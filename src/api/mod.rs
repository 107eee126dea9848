//! HTTP surface: JWT, middleware, handlers and routes

pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;
