//! Integration tests for the user service over the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use domain::{CreateUser, Cpf, Email, FormatField, UpdateUser, User};
use user_registry::errors::{AppError, AppResult};
use user_registry::infra::{InMemoryUserStore, UserRepository};
use user_registry::services::{HashGenerator, UserManager, UserService};
use user_registry::types::{ListOptions, SortField, SortOrder, UserFilters};

/// Hasher that tags the plain text and counts calls
#[derive(Default)]
struct CountingHasher {
    calls: AtomicUsize,
}

#[async_trait]
impl HashGenerator for CountingHasher {
    async fn hash(&self, plain: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("hashed:{}", plain))
    }
}

mock! {
    Repo {}

    #[async_trait]
    impl UserRepository for Repo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;
        async fn find_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<User>>;
        async fn exists_by_email(&self, email: &Email) -> AppResult<bool>;
        async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool>;
        async fn create(&self, user: &User) -> AppResult<User>;
        async fn update(&self, user: &User) -> AppResult<User>;
        async fn delete(&self, id: Uuid) -> AppResult<bool>;
        async fn find_many(
            &self,
            filters: &UserFilters,
            options: &ListOptions,
        ) -> AppResult<(Vec<User>, u64)>;
        async fn count(&self, filters: &UserFilters) -> AppResult<u64>;
    }
}

fn input(name: &str, email: &str, cpf: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "senha123".to_string(),
        cpf: cpf.to_string(),
        phone: None,
    }
}

fn service() -> (UserManager, Arc<CountingHasher>) {
    let hasher = Arc::new(CountingHasher::default());
    let manager = UserManager::new(Arc::new(InMemoryUserStore::new()), hasher.clone());
    (manager, hasher)
}

#[tokio::test]
async fn test_register_and_lookup_by_any_spelling() {
    let (service, hasher) = service();

    let created = assert_ok!(
        service
            .create_user(CreateUser {
                phone: Some("(11) 98765-4321".to_string()),
                ..input("João Silva", "  JOAO@Example.COM ", "111.444.777-35")
            })
            .await
    );
    assert_eq!(hasher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(created.password().as_str(), "hashed:senha123");

    let by_email = assert_ok!(service.get_user_by_email("joao@example.com").await);
    let by_cpf = assert_ok!(service.get_user_by_cpf("11144477735").await);
    assert_eq!(by_email.id(), created.id());
    assert_eq!(by_cpf.id(), created.id());
    assert_eq!(by_cpf.phone().value(), "+5511987654321");
}

#[tokio::test]
async fn test_duplicates_detected_on_canonical_forms() {
    let (service, hasher) = service();
    assert_ok!(
        service
            .create_user(input("Ana", "ana@example.com", "11144477735"))
            .await
    );

    let err = assert_err!(
        service
            .create_user(input("Outra Ana", "ANA@EXAMPLE.COM", "12345678909"))
            .await
    );
    assert!(matches!(err, AppError::Conflict(msg) if msg == "E-mail já cadastrado: ana@example.com"));

    let err = assert_err!(
        service
            .create_user(input("Outra Ana", "outra@example.com", "111.444.777-35"))
            .await
    );
    assert!(matches!(err, AppError::Conflict(msg) if msg == "CPF já cadastrado: 11144477735"));

    // Rejected registrations never reach the hasher.
    assert_eq!(hasher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_fields_are_reported() {
    let (service, _) = service();

    let err = assert_err!(
        service
            .create_user(input("Ana", "test..test@example.com", "11144477735"))
            .await
    );
    assert!(matches!(err, AppError::InvalidField(FormatField::Email)));

    let err = assert_err!(service.create_user(input("Ana", "ana@example.com", "11111111111")).await);
    assert!(matches!(err, AppError::InvalidField(FormatField::Cpf)));

    let err = assert_err!(
        service
            .create_user(CreateUser {
                phone: Some("+1234567890123".to_string()),
                ..input("Ana", "ana@example.com", "11144477735")
            })
            .await
    );
    assert!(matches!(err, AppError::InvalidField(FormatField::Phone)));
}

#[tokio::test]
async fn test_update_flow() {
    let (service, _) = service();
    let first = assert_ok!(
        service
            .create_user(CreateUser {
                phone: Some("11987654321".to_string()),
                ..input("Ana", "ana@example.com", "11144477735")
            })
            .await
    );
    let second = assert_ok!(
        service
            .create_user(input("Bia", "bia@example.com", "12345678909"))
            .await
    );

    let err = assert_err!(
        service
            .update_user(
                second.id(),
                UpdateUser {
                    email: Some("ana@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
    );
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = assert_ok!(
        service
            .update_user(
                first.id(),
                UpdateUser {
                    name: Some("Ana Maria".to_string()),
                    phone: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
    );
    assert_eq!(updated.name(), "Ana Maria");
    assert!(!updated.has_phone());
    assert_eq!(updated.created_at(), first.created_at());
    assert!(updated.updated_at() > first.updated_at());

    let stored = assert_ok!(service.get_user(first.id()).await);
    assert_eq!(stored, updated);

    let err = assert_err!(service.update_user(Uuid::new_v4(), UpdateUser::default()).await);
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_delete_then_lookup() {
    let (service, _) = service();
    let user = assert_ok!(
        service
            .create_user(input("Ana", "ana@example.com", "11144477735"))
            .await
    );

    assert_ok!(service.delete_user(user.id()).await);
    assert!(matches!(service.get_user(user.id()).await, Err(AppError::NotFound)));
    assert!(matches!(service.delete_user(user.id()).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_list_with_filters_and_sorting() {
    let (service, _) = service();
    for (name, email, cpf) in [
        ("Carla Souza", "carla@example.com", "98765432100"),
        ("Ana Souza", "ana@example.com", "11144477735"),
        ("Bruno Lima", "bruno@test.org", "12345678909"),
    ] {
        assert_ok!(service.create_user(input(name, email, cpf)).await);
    }

    let page = assert_ok!(
        service
            .list_users(
                UserFilters {
                    name: Some("SOUZA".to_string()),
                    ..Default::default()
                },
                ListOptions::new(None, None, Some(SortField::Name), Some(SortOrder::Asc)),
            )
            .await
    );
    let names: Vec<_> = page.data.iter().map(|u| u.name()).collect();
    assert_eq!(names, vec!["Ana Souza", "Carla Souza"]);
    assert_eq!(page.meta.total, 2);
    assert!(!page.meta.has_next);

    let page = assert_ok!(
        service
            .list_users(
                UserFilters::default(),
                ListOptions::new(Some(2), Some(2), Some(SortField::Email), Some(SortOrder::Asc)),
            )
            .await
    );
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].email().as_str(), "carla@example.com");
    assert_eq!(page.meta.total_pages, 2);
    assert!(page.meta.has_prev);
}

#[tokio::test]
async fn test_repository_failure_aborts_registration() {
    let mut repo = MockRepo::new();
    repo.expect_exists_by_email()
        .returning(|_| Err(AppError::internal("connection reset")));
    repo.expect_exists_by_cpf().returning(|_| Ok(false));
    repo.expect_create().never();

    let hasher = Arc::new(CountingHasher::default());
    let service = UserManager::new(Arc::new(repo), hasher.clone());

    let err = assert_err!(
        service
            .create_user(input("Ana", "ana@example.com", "11144477735"))
            .await
    );
    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_store_conflict_surfaces_from_create() {
    let mut repo = MockRepo::new();
    repo.expect_exists_by_email().returning(|_| Ok(false));
    repo.expect_exists_by_cpf().returning(|_| Ok(false));
    repo.expect_create()
        .times(1)
        .returning(|_| Err(AppError::conflict("E-mail ou CPF já cadastrado")));

    let service = UserManager::new(Arc::new(repo), Arc::new(CountingHasher::default()));
    let err = assert_err!(
        service
            .create_user(input("Ana", "ana@example.com", "11144477735"))
            .await
    );
    assert!(matches!(err, AppError::Conflict(_)));
}
