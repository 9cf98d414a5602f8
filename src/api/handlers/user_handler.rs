//! User handlers.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use domain::{CreateUser, UpdateUser, User};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::types::{
    Created, ListOptions, NoContent, PaginationMeta, SortField, SortOrder, UserFilters,
};
use crate::utils::sanitize_str;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\s'.\-]+$").unwrap());

// Empty is accepted so updates can clear the phone.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:|(?:\+55\s?)?\(?\d{2}\)?\s?\d{4,5}-?\d{4})$").unwrap()
});

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 2, max = 100, message = "Nome deve ter entre 2 e 100 caracteres"),
        regex(path = *NAME_PATTERN, message = "Nome contém caracteres inválidos")
    )]
    #[schema(example = "João Silva")]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    #[schema(example = "joao@example.com")]
    pub email: String,
    #[validate(length(min = 6, max = 20, message = "Senha deve ter entre 6 e 20 caracteres"))]
    #[schema(example = "senha123")]
    pub password: String,
    #[validate(length(min = 1, message = "CPF é obrigatório"))]
    #[schema(example = "111.444.777-35")]
    pub cpf: String,
    #[validate(regex(path = *PHONE_PATTERN, message = "Número de telefone inválido"))]
    #[schema(example = "(11) 98765-4321")]
    pub phone: Option<String>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            cpf: req.cpf,
            phone: req.phone,
        }
    }
}

/// User update request. Absent fields are left unchanged; an empty phone
/// removes it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 2, max = 100, message = "Nome deve ter entre 2 e 100 caracteres"),
        regex(path = *NAME_PATTERN, message = "Nome contém caracteres inválidos")
    )]
    pub name: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_PATTERN, message = "Número de telefone inválido"))]
    pub phone: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Senha deve ter entre 6 e 20 caracteres"))]
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        }
    }
}

/// User as returned by the API, with display-formatted CPF and phone
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "João Silva")]
    pub name: String,
    #[schema(example = "joao@example.com")]
    pub email: String,
    #[schema(example = "111.444.777-35")]
    pub cpf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "+55 (11) 98765-4321")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            email: user.email().as_str().to_string(),
            cpf: user.cpf().formatted(),
            phone: user.has_phone().then(|| user.phone().formatted()),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// One page of users
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub meta: PaginationMeta,
}

/// Paging, ordering and filters for the user listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Page size, 1 to 100
    pub limit: Option<u64>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// Case-insensitive partial match on name
    pub name: Option<String>,
    /// Partial match on e-mail
    pub email: Option<String>,
    /// Exact CPF, with or without separators
    pub cpf: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl ListUsersQuery {
    fn into_parts(self) -> (UserFilters, ListOptions) {
        let clean = |value: Option<String>| value.map(|v| sanitize_str(&v));
        let filters = UserFilters {
            name: clean(self.name),
            email: clean(self.email),
            cpf: clean(self.cpf),
            created_after: self.created_after,
            created_before: self.created_before,
        };
        let options = ListOptions::new(self.page, self.limit, self.sort_by, self.sort_order);
        (filters, options)
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/email/:email", get(get_user_by_email))
        .route("/cpf/:cpf", get(get_user_by_cpf))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error or invalid CPF, e-mail or phone"),
        (status = 409, description = "E-mail or CPF already registered"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state.user_service.create_user(payload.into()).await?;
    Ok(Created(UserResponse::from(user)))
}

/// List users with filters and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = UserListResponse),
        (status = 400, description = "Invalid query parameters")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> AppResult<Json<UserListResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (filters, options) = query.into_parts();

    let page = state.user_service.list_users(filters, options).await?;
    let page = page.map(UserResponse::from);

    Ok(Json(UserListResponse {
        data: page.data,
        meta: page.meta,
    }))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Get user by e-mail
#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = "Users",
    params(
        ("email" = String, Path, description = "E-mail, case-insensitive")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid e-mail"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user_by_email(&email).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Get user by CPF
#[utoipa::path(
    get,
    path = "/users/cpf/{cpf}",
    tag = "Users",
    params(
        ("cpf" = String, Path, description = "CPF, with or without separators")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid CPF"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user_by_cpf(&cpf).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "E-mail already registered")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.update_user(id, payload.into()).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UserProps;

    fn valid_create() -> CreateUserRequest {
        CreateUserRequest {
            name: "João da Silva".to_string(),
            email: "joao@example.com".to_string(),
            password: "senha123".to_string(),
            cpf: "111.444.777-35".to_string(),
            phone: Some("(11) 98765-4321".to_string()),
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(valid_create().validate().is_ok());

        let req = CreateUserRequest {
            name: "A".to_string(),
            ..valid_create()
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            name: "R2-D2".to_string(),
            ..valid_create()
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            password: "123".to_string(),
            ..valid_create()
        };
        assert!(req.validate().is_err());

        let req = CreateUserRequest {
            cpf: String::new(),
            ..valid_create()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_phone_pattern() {
        for phone in ["11987654321", "(11) 98765-4321", "+55 11 3456-7890", "+5511987654321"] {
            assert!(PHONE_PATTERN.is_match(phone), "{phone}");
        }
        for phone in ["123", "+1 555 123 4567", "abc"] {
            assert!(!PHONE_PATTERN.is_match(phone), "{phone}");
        }
    }

    #[test]
    fn test_update_request_allows_empty_body_and_phone_removal() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let req = UpdateUserRequest {
            phone: Some(String::new()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_user_response_formats_identity_fields() {
        let user = User::create(UserProps {
            id: Uuid::new_v4(),
            name: "João Silva".to_string(),
            email: "joao@example.com".to_string(),
            password_hash: "hash".to_string(),
            cpf: "11144477735".to_string(),
            phone: Some("1134567890".to_string()),
            created_at: None,
            updated_at: None,
        })
        .unwrap();

        let response = UserResponse::from(&user);
        assert_eq!(response.cpf, "111.444.777-35");
        assert_eq!(response.phone.as_deref(), Some("+55 (11) 3456-7890"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_list_query_sanitizes_filters() {
        let query = ListUsersQuery {
            name: Some("<b>Ana</b>".to_string()),
            cpf: Some("111.444.777-35".to_string()),
            limit: Some(500),
            ..Default::default()
        };
        let (filters, options) = query.into_parts();
        assert_eq!(filters.name.as_deref(), Some("Ana"));
        assert_eq!(filters.cpf_digits().as_deref(), Some("11144477735"));
        assert_eq!(options.limit, 100);
    }
}
