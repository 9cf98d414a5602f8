//! Identity value objects.
//!
//! Each type is constructed through a fallible `parse`, stores a canonical
//! form and compares by it.

mod cpf;
mod email;
mod phone;

pub use cpf::Cpf;
pub use email::Email;
pub use phone::Phone;
