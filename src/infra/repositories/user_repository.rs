//! User repository backed by PostgreSQL through SeaORM.

use async_trait::async_trait;
use domain::{Cpf, Email, User};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::errors::{AppError, AppResult};
use crate::types::{ListOptions, SortField, SortOrder, UserFilters};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User persistence contract.
///
/// E-mail and CPF lookups take value objects, so callers always query with
/// canonical forms.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    async fn find_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool>;

    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool>;

    /// Insert a new user. Unique violations surface as `AppError::Conflict`.
    async fn create(&self, user: &User) -> AppResult<User>;

    /// Overwrite an existing user. `AppError::NotFound` if the id is unknown.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// One page of users matching `filters`, plus the total match count.
    async fn find_many(
        &self,
        filters: &UserFilters,
        options: &ListOptions,
    ) -> AppResult<(Vec<User>, u64)>;

    async fn count(&self, filters: &UserFilters) -> AppResult<u64>;
}

/// `%` and `_` in the needle match themselves, as in the in-memory store.
fn contains_pattern(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&needle.to_lowercase()))).escape('\\')
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filters: &UserFilters) -> Select<UserEntity> {
        let mut condition = Condition::all();

        if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
            condition = condition.add(
                Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                    .like(contains_pattern(name)),
            );
        }
        if let Some(email) = filters.email.as_deref().filter(|e| !e.is_empty()) {
            condition =
                condition.add(Expr::col(user::Column::Email).like(contains_pattern(email)));
        }
        if let Some(cpf) = filters.cpf_digits() {
            condition = condition.add(user::Column::Cpf.eq(cpf));
        }
        if let Some(after) = filters.created_after {
            condition = condition.add(user::Column::CreatedAt.gte(after));
        }
        if let Some(before) = filters.created_before {
            condition = condition.add(user::Column::CreatedAt.lte(before));
        }

        UserEntity::find().filter(condition)
    }

    async fn one(&self, query: Select<UserEntity>) -> AppResult<Option<User>> {
        query.one(&self.db).await?.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.one(UserEntity::find_by_id(id)).await
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        self.one(UserEntity::find().filter(user::Column::Email.eq(email.as_str())))
            .await
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<User>> {
        self.one(UserEntity::find().filter(user::Column::Cpf.eq(cpf.value())))
            .await
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Cpf.eq(cpf.value()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let model = ActiveModel::from(user).insert(&self.db).await?;
        User::try_from(model)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        match ActiveModel::from(user).update(&self.db).await {
            Ok(model) => User::try_from(model),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_many(
        &self,
        filters: &UserFilters,
        options: &ListOptions,
    ) -> AppResult<(Vec<User>, u64)> {
        let column = match options.sort_by {
            SortField::Name => user::Column::Name,
            SortField::Email => user::Column::Email,
            SortField::CreatedAt => user::Column::CreatedAt,
        };
        let order = match options.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let paginator = Self::filtered(filters)
            .order_by(column, order.clone())
            .order_by(user::Column::Id, order)
            .paginate(&self.db, options.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(options.page.saturating_sub(1)).await?;

        let users = models
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((users, total))
    }

    async fn count(&self, filters: &UserFilters) -> AppResult<u64> {
        Ok(Self::filtered(filters).count(&self.db).await?)
    }
}
