//! Customer authentication service.
//!
//! Email and password accounts with Argon2id hashes. The hashed password never
//! leaves this module and the customer repository.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use mais_saude_core::{CustomerId, Email, Phone};

use crate::db::{CustomerRepository, RepositoryError};
use crate::models::{Customer, CustomerProfile};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
}

/// Authentication service.
///
/// Handles customer registration, login and profile lookups.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
        }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::MissingName` or `AuthError::InvalidPhone` for a bad profile.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::CustomerAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: &Registration<'_>) -> Result<Customer, AuthError> {
        let email = Email::parse(form.email)?;

        let name = form.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let phone = Phone::parse(form.phone)?;

        validate_password(form.password)?;
        let password_hash = hash_password(form.password)?;

        let profile = CustomerProfile {
            name: name.to_owned(),
            phone: phone.national().to_owned(),
            ..CustomerProfile::default()
        };

        self.customers
            .create(&email, &password_hash, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::CustomerAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        let email = Email::parse(email)?;

        let (customer, password_hash) = self
            .customers
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CustomerNotFound` if the customer doesn't exist.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, AuthError> {
        self.customers
            .get_by_id(id)
            .await?
            .ok_or(AuthError::CustomerNotFound)
    }

    /// Save the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName` or `AuthError::InvalidPhone` for a bad profile.
    /// Returns `AuthError::CustomerNotFound` if the customer doesn't exist.
    pub async fn update_profile(
        &self,
        id: CustomerId,
        profile: CustomerProfile,
    ) -> Result<Customer, AuthError> {
        let profile = normalize_profile(profile)?;
        self.customers
            .update_profile(id, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::CustomerNotFound,
                other => AuthError::Repository(other),
            })
    }
}

/// Trim every field, require a name and normalize a non-blank phone to digits.
///
/// # Errors
///
/// Returns `AuthError::MissingName` or `AuthError::InvalidPhone`.
pub fn normalize_profile(profile: CustomerProfile) -> Result<CustomerProfile, AuthError> {
    let trim = |s: String| s.trim().to_owned();

    let name = trim(profile.name);
    if name.is_empty() {
        return Err(AuthError::MissingName);
    }
    let phone = trim(profile.phone);
    let phone = if phone.is_empty() {
        phone
    } else {
        Phone::parse(&phone)?.national().to_owned()
    };

    Ok(CustomerProfile {
        name,
        phone,
        address: trim(profile.address),
        neighborhood: trim(profile.neighborhood),
        complement: trim(profile.complement),
        city: trim(profile.city),
        state: trim(profile.state).to_uppercase(),
        zipcode: trim(profile.zipcode),
    })
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_LENGTH} caracteres."
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
