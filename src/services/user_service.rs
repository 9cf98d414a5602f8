//! User service - Handles user-related business logic.
//!
//! Uniqueness checks and password hashing happen here, before the
//! aggregate is built; the aggregate itself does no I/O.

use async_trait::async_trait;
use domain::{
    CreateUser, Cpf, DomainError, Email, Phone, UpdateUser, User, UserChanges, UserProps,
};
use std::sync::Arc;
use uuid::Uuid;

use super::hasher::HashGenerator;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;
use crate::types::{ListOptions, Paginated, UserFilters};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a user. Fails with a conflict when the e-mail or CPF is
    /// already taken.
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Look up by e-mail in any accepted spelling
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Look up by CPF, with or without separators
    async fn get_user_by_cpf(&self, cpf: &str) -> AppResult<User>;

    /// Replace the given fields. A new e-mail must not belong to another user.
    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User>;

    /// Permanently delete user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    async fn list_users(
        &self,
        filters: UserFilters,
        options: ListOptions,
    ) -> AppResult<Paginated<User>>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn HashGenerator>,
}

impl UserManager {
    /// Create new user service instance
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn HashGenerator>) -> Self {
        Self { repo, hasher }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        // Canonical forms first, so "A@X.com" and "a@x.com" collide.
        let email = Email::parse(&input.email)?;
        let cpf = Cpf::parse(&input.cpf)?;
        Phone::parse(input.phone.as_deref())?;

        let (email_taken, cpf_taken) = tokio::try_join!(
            self.repo.exists_by_email(&email),
            self.repo.exists_by_cpf(&cpf)
        )?;
        if email_taken {
            return Err(DomainError::duplicate_email(email.as_str()).into());
        }
        if cpf_taken {
            return Err(DomainError::duplicate_cpf(cpf.value()).into());
        }

        let password_hash = self.hasher.hash(&input.password).await?;

        let user = User::create(UserProps {
            id: Uuid::new_v4(),
            name: input.name,
            email: email.into_inner(),
            password_hash,
            cpf: cpf.into_inner(),
            phone: input.phone,
            created_at: None,
            updated_at: None,
        })?;

        let user = self.repo.create(&user).await?;
        metrics::counter!("user_registrations_total").increment(1);
        tracing::info!(user_id = %user.id(), "User registered");

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        let email = Email::parse(email)?;
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or_not_found()
    }

    async fn get_user_by_cpf(&self, cpf: &str) -> AppResult<User> {
        let cpf = Cpf::parse(cpf)?;
        self.repo.find_by_cpf(&cpf).await?.ok_or_not_found()
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let current = self.get_user(id).await?;

        if let Some(raw) = input.email.as_deref().filter(|e| !e.is_empty()) {
            let email = Email::parse(raw)?;
            if let Some(owner) = self.repo.find_by_email(&email).await? {
                if owner.id() != id {
                    return Err(DomainError::duplicate_email(email.as_str()).into());
                }
            }
        }

        let password_hash = match input.password.as_deref() {
            Some(plain) => Some(self.hasher.hash(plain).await?),
            None => None,
        };

        let updated = current.update(UserChanges {
            name: input.name,
            email: input.email,
            phone: input.phone,
            password_hash,
        })?;

        let user = self.repo.update(&updated).await?;
        tracing::info!(user_id = %id, "User updated");

        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn list_users(
        &self,
        filters: UserFilters,
        options: ListOptions,
    ) -> AppResult<Paginated<User>> {
        let (users, total) = self.repo.find_many(&filters, &options).await?;
        Ok(Paginated::new(users, &options, total))
    }
}
