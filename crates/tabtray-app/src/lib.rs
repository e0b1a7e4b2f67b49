pub mod bridge;
pub mod config;
pub mod host;
pub mod persistence;
pub mod runtime;
