pub mod assistant;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod portal;
pub mod store;
pub mod telemetry;
pub mod workflows;
