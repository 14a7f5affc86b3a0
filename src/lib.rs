pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod server;
pub mod strategies;
pub mod types;
