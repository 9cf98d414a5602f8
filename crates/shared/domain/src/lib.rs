//! Domain layer - identity value objects and the user aggregate.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Every value object validates at construction, so holding one is proof
//! that the value is well formed.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;
pub mod value_objects;

pub use constants::*;
pub use error::{DomainError, DomainResult, FormatField, IdentityField};
pub use password::Password;
pub use user::{CreateUser, UpdateUser, User, UserChanges, UserProps, UserPublic};
pub use value_objects::{Cpf, Email, Phone};
