//! User Registry - user registration API for Brazilian identity data
//!
//! Users are identified by a validated CPF and e-mail, with an optional
//! Brazilian phone number. The domain rules live in the `domain` crate;
//! this crate wires them to PostgreSQL and an axum HTTP API.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, repositories, metrics)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **utils**: Input sanitization
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Start without a database
//! cargo run -- serve --in-memory
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Cpf, Email, Phone, User};
pub use errors::{AppError, AppResult};
