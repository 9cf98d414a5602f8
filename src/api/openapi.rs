//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::{health_handler, user_handler};
use crate::config::API_VERSION;
use crate::types::{PaginationMeta, SortField, SortOrder};

/// OpenAPI documentation for the user registry
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Registry API",
        description = "User registration with CPF, e-mail and phone validation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        health_handler::health,
        user_handler::create_user,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::get_user_by_email,
        user_handler::get_user_by_cpf,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            user_handler::UserResponse,
            user_handler::UserListResponse,
            health_handler::HealthResponse,
            health_handler::ServiceHealth,
            health_handler::ServiceStatus,
            PaginationMeta,
            SortField,
            SortOrder,
        )
    ),
    tags(
        (name = "Users", description = "User registration and lookup"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// OpenAPI document with the running API version
    pub fn document() -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        doc.info.version = API_VERSION.to_string();
        doc
    }
}
