//! In-memory user repository.
//!
//! Used by `serve --in-memory` and by router tests. Mirrors the SeaORM
//! store: unique e-mail and CPF, the same filters, ordering and paging.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Cpf, DomainError, Email, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::user_repository::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::types::{ListOptions, SortField, SortOrder, UserFilters};

/// Lock-protected map of users keyed by id
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject an e-mail or CPF already held by another user.
    fn check_unique(users: &HashMap<Uuid, User>, candidate: &User) -> AppResult<()> {
        for other in users.values().filter(|u| u.id() != candidate.id()) {
            if other.email() == candidate.email() {
                return Err(DomainError::duplicate_email(candidate.email().as_str()).into());
            }
            if other.cpf() == candidate.cpf() {
                return Err(DomainError::duplicate_cpf(candidate.cpf().value()).into());
            }
        }
        Ok(())
    }
}

fn matches_filters(filters: &UserFilters, user: &User) -> bool {
    if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
        if !user.name().to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(email) = filters.email.as_deref().filter(|e| !e.is_empty()) {
        if !user.email().as_str().contains(&email.to_lowercase()) {
            return false;
        }
    }
    if let Some(cpf) = filters.cpf_digits() {
        if user.cpf().value() != cpf {
            return false;
        }
    }
    if filters.created_after.is_some_and(|after| user.created_at() < after) {
        return false;
    }
    if filters
        .created_before
        .is_some_and(|before| user.created_at() > before)
    {
        return false;
    }
    true
}

fn compare(options: &ListOptions, a: &User, b: &User) -> Ordering {
    let primary = match options.sort_by {
        SortField::Name => a.name().cmp(b.name()),
        SortField::Email => a.email().as_str().cmp(b.email().as_str()),
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
    };
    let ordering = primary.then_with(|| a.id().cmp(&b.id()));
    match options.sort_order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.cpf() == cpf).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email() == email))
    }

    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.cpf() == cpf))
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id()) {
            return Err(AppError::conflict(format!("User {} already exists", user.id())));
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id()) {
            return Err(AppError::NotFound);
        }
        Self::check_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn find_many(
        &self,
        filters: &UserFilters,
        options: &ListOptions,
    ) -> AppResult<(Vec<User>, u64)> {
        let users = self.users.read().await;
        let mut matched: Vec<&User> = users
            .values()
            .filter(|u| matches_filters(filters, u))
            .collect();
        matched.sort_by(|a, b| compare(options, a, b));

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(usize::try_from(options.offset()).unwrap_or(usize::MAX))
            .take(options.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count(&self, filters: &UserFilters) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| matches_filters(filters, u)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::UserProps;

    fn user(name: &str, email: &str, cpf: &str, age_days: i64) -> User {
        let created = Utc::now() - Duration::days(age_days);
        User::create(UserProps {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            cpf: cpf.to_string(),
            phone: None,
            created_at: Some(created),
            updated_at: Some(created),
        })
        .unwrap()
    }

    async fn seeded() -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .create(&user("Ana Souza", "ana@example.com", "11144477735", 3))
            .await
            .unwrap();
        store
            .create(&user("Bruno Lima", "bruno@test.org", "12345678909", 2))
            .await
            .unwrap();
        store
            .create(&user("Carla Souza", "carla@example.com", "98765432100", 1))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = seeded().await;
        let email = Email::parse("ANA@example.com").unwrap();
        let cpf = Cpf::parse("123.456.789-09").unwrap();

        assert!(store.exists_by_email(&email).await.unwrap());
        assert_eq!(
            store.find_by_cpf(&cpf).await.unwrap().unwrap().name(),
            "Bruno Lima"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_cpf() {
        let store = seeded().await;
        let result = store
            .create(&user("Outra", "outra@example.com", "111.444.777-35", 0))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.starts_with("CPF")));
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let store = InMemoryUserStore::new();
        let result = store
            .update(&user("Ana", "ana@example.com", "11144477735", 0))
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_filters_by_name_case_insensitive() {
        let store = seeded().await;
        let filters = UserFilters {
            name: Some("souza".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count(&filters).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_like_wildcards_match_literally() {
        let store = seeded().await;
        for needle in ["%", "_", "a_a"] {
            let filters = UserFilters {
                name: Some(needle.to_string()),
                email: Some(needle.to_string()),
                ..Default::default()
            };
            assert_eq!(store.count(&filters).await.unwrap(), 0, "{needle}");
        }
    }

    #[tokio::test]
    async fn test_filters_by_cpf_and_dates() {
        let store = seeded().await;
        let filters = UserFilters {
            cpf: Some("987.654.321-00".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count(&filters).await.unwrap(), 1);

        let filters = UserFilters {
            created_after: Some(Utc::now() - Duration::hours(36)),
            ..Default::default()
        };
        assert_eq!(store.count(&filters).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_many_sorts_and_pages() {
        let store = seeded().await;

        let options = ListOptions::new(Some(1), Some(2), Some(SortField::Name), Some(SortOrder::Asc));
        let (page, total) = store.find_many(&UserFilters::default(), &options).await.unwrap();
        assert_eq!(total, 3);
        let names: Vec<_> = page.iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["Ana Souza", "Bruno Lima"]);

        let options = ListOptions::new(Some(2), Some(2), Some(SortField::Name), Some(SortOrder::Asc));
        let (page, _) = store.find_many(&UserFilters::default(), &options).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name(), "Carla Souza");
    }

    #[tokio::test]
    async fn test_find_many_past_last_page() {
        let store = seeded().await;
        let options = ListOptions::new(Some(u64::MAX), Some(100), None, None);
        let (page, total) = store.find_many(&UserFilters::default(), &options).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_default_order_is_newest_first() {
        let store = seeded().await;
        let (page, _) = store
            .find_many(&UserFilters::default(), &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(page[0].name(), "Carla Souza");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = seeded().await;
        let cpf = Cpf::parse("11144477735").unwrap();
        let id = store.find_by_cpf(&cpf).await.unwrap().unwrap().id();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.find_by_id(id).await.unwrap().is_none());
    }
}
