//! Slotbook - an appointment booking service
//!
//! Organizations publish weekly business hours; individuals book the time
//! slots generated from them. The core is slot generation, availability
//! reconciliation against bookings and locked days, and per-day status
//! aggregation.
//!
//! # Architecture
//! - `scheduling`: clock/day types, settings, slot generation, availability, status
//! - `storage`: in-memory store for users, settings, appointments and locked days
//! - `cache`: generated-slot cache (moka or no-op)
//! - `services`: business logic shared by the HTTP handlers
//! - `api`: HTTP handlers, middleware and JWT
//! - `config`: static configuration (TOML + `SB__` env)
//! - `runtime`: server startup, shutdown and CLI modes
//! - `system`: logging

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod scheduling;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
