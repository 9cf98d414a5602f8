//! Pagination, sorting and filtering types for list endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Column a user listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "email")]
    Email,
    #[default]
    #[serde(rename = "createdAt", alias = "created_at")]
    CreatedAt,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Normalized paging and ordering for a listing.
///
/// Built through [`ListOptions::new`], which clamps `page` to
/// `1..=MAX_PAGE_NUMBER` and `limit` to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u64,
    pub limit: u64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ListOptions {
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        sort_by: Option<SortField>,
        sort_order: Option<SortOrder>,
    ) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE_NUMBER).clamp(1, MAX_PAGE_NUMBER),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort_by: sort_by.unwrap_or_default(),
            sort_order: sort_order.unwrap_or_default(),
        }
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// Optional user filters. Text filters are partial, case-insensitive
/// matches; `cpf` matches the canonical digits exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl UserFilters {
    /// Digits of the CPF filter, ignoring separators. `None` when the filter
    /// is absent or carries no digits.
    pub fn cpf_digits(&self) -> Option<String> {
        self.cpf
            .as_deref()
            .map(|raw| raw.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|digits| !digits.is_empty())
    }
}

/// A page of results
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, options: &ListOptions, total: u64) -> Self {
        let total_pages = total.div_ceil(options.limit);

        Self {
            data,
            meta: PaginationMeta {
                page: options.page,
                limit: options.limit,
                total,
                total_pages,
                has_next: options.page < total_pages,
                has_prev: options.page > 1,
            },
        }
    }

    /// Convert each item, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
