//! Utility functions and helpers.

pub mod sanitize;

pub use sanitize::{sanitize_str, sanitize_value};
