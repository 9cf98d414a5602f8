//! User database entity for SeaORM.

use domain::{User, UserProps};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::errors::AppError;

/// Identity columns hold canonical forms: lowercase e-mail, 11 CPF digits,
/// `+55…` phone.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    #[sea_orm(unique)]
    pub cpf: String,
    pub phone: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Rebuild the aggregate from a stored row. Rows are written from valid
/// users, so a failure here means the table was edited by hand.
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        User::create(UserProps {
            id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            cpf: model.cpf,
            phone: model.phone,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        })
        .map_err(|e| AppError::internal(format!("Stored user {} is invalid: {}", id, e)))
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id()),
            name: Set(user.name().to_string()),
            email: Set(user.email().as_str().to_string()),
            password_hash: Set(user.password().as_str().to_string()),
            cpf: Set(user.cpf().value().to_string()),
            phone: Set(user.phone().as_option().map(str::to_string)),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
        }
    }
}
