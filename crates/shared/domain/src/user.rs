//! User aggregate and related input types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::password::Password;
use crate::value_objects::{Cpf, Email, Phone};

/// Raw primitives a [`User`] is built from.
///
/// `password_hash` must already be hashed; the aggregate never sees plain
/// passwords.
#[derive(Debug, Clone)]
pub struct UserProps {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial set of fields to replace on update. `None` keeps the current
/// value; `Some("")` for phone removes it.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

/// User aggregate root.
///
/// Immutable: [`User::update`] returns a new value. Every identity field is
/// a validated value object, so a `User` cannot hold a malformed e-mail,
/// CPF or phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    name: String,
    email: Email,
    password: Password,
    cpf: Cpf,
    phone: Phone,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from raw primitives.
    ///
    /// Fields are validated in order e-mail, CPF, phone; the first failure
    /// is returned unchanged and no user is produced. Missing timestamps
    /// default to now.
    pub fn create(props: UserProps) -> DomainResult<Self> {
        let email = Email::parse(&props.email)?;
        let cpf = Cpf::parse(&props.cpf)?;
        let phone = Phone::parse(props.phone.as_deref())?;

        let now = Utc::now();
        let created_at = props.created_at.unwrap_or(now);
        let updated_at = props.updated_at.unwrap_or_else(|| created_at.max(now));
        if updated_at < created_at {
            return Err(DomainError::validation(
                "updated_at must not precede created_at",
            ));
        }

        Ok(Self {
            id: props.id,
            name: props.name,
            email,
            password: Password::from_hash(props.password_hash),
            cpf,
            phone,
            created_at,
            updated_at,
        })
    }

    /// Return a copy with the given fields replaced.
    ///
    /// E-mail and phone are re-validated; an empty e-mail keeps the current
    /// one, while an empty phone clears it. `created_at` is kept and
    /// `updated_at` moves strictly forward, even when the clock has not
    /// advanced since the last change.
    pub fn update(&self, changes: UserChanges) -> DomainResult<Self> {
        let email = match changes.email.as_deref().filter(|e| !e.is_empty()) {
            Some(raw) => Email::parse(raw)?,
            None => self.email.clone(),
        };
        let phone = match changes.phone.as_deref() {
            Some(raw) => Phone::parse(Some(raw))?,
            None => self.phone.clone(),
        };
        let password = changes
            .password_hash
            .map(Password::from_hash)
            .unwrap_or_else(|| self.password.clone());

        // Storage keeps microsecond precision.
        let updated_at = Utc::now().max(self.updated_at + Duration::microseconds(1));

        Ok(Self {
            id: self.id,
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            email,
            password,
            cpf: self.cpf.clone(),
            phone,
            created_at: self.created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_phone(&self) -> bool {
        !self.phone.is_empty()
    }

    /// Every field except the password, in canonical form.
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            name: self.name.clone(),
            email: self.email.as_str().to_string(),
            cpf: self.cpf.value().to_string(),
            phone: self.phone.as_option().map(str::to_string),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Password-free view of a user with canonical identity values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserPublic {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User creation input, with a plain password
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub phone: Option<String>,
}

/// User update input. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}
