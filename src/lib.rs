//! ReparaYa - marketplace backend connecting clients with home-repair
//! contractors.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, Redis, geocoding)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! Entities, the service visibility state machine and the location privacy
//! filter live in the `domain` workspace crate.
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Insert the default categories
//! cargo run -- seed
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use infra::Cache;
