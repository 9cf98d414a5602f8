//! Shared types for list endpoints and responses.

mod pagination;
mod response;

pub use pagination::{ListOptions, Paginated, PaginationMeta, SortField, SortOrder, UserFilters};
pub use response::{Created, NoContent};
