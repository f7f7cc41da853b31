//! Customer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mais_saude_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::{Customer, CustomerProfile};

const CUSTOMER_COLUMNS: &str = "id, email, name, phone, address, neighborhood, complement, \
                                city, state, zipcode, created_at";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    email: String,
    name: String,
    phone: String,
    address: String,
    neighborhood: String,
    complement: String,
    city: String,
    state: String,
    zipcode: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(r: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            email,
            profile: CustomerProfile {
                name: r.name,
                phone: r.phone,
                address: r.address,
                neighborhood: r.neighborhood,
                complement: r.complement,
                city: r.city,
                state: r.state,
                zipcode: r.zipcode,
            },
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerWithHashRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password_hash: String,
}

/// Repository for customer accounts.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM shop.customer WHERE id = $1");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Create a customer with a password hash and initial profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        profile: &CustomerProfile,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO shop.customer (email, password_hash, name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {CUSTOMER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(&profile.name)
            .bind(&profile.phone)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "email"))?;

        Customer::try_from(row)
    }

    /// Get a customer together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS}, password_hash FROM shop.customer WHERE email = $1"
        );
        let row = sqlx::query_as::<_, CustomerWithHashRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        let customer = Customer::try_from(r.customer)?;
        Ok(Some((customer, r.password_hash)))
    }

    /// Replace the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_profile(
        &self,
        id: CustomerId,
        profile: &CustomerProfile,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            r"
            UPDATE shop.customer
            SET name = $2, phone = $3, address = $4, neighborhood = $5, complement = $6,
                city = $7, state = $8, zipcode = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .bind(&profile.name)
            .bind(&profile.phone)
            .bind(&profile.address)
            .bind(&profile.neighborhood)
            .bind(&profile.complement)
            .bind(&profile.city)
            .bind(&profile.state)
            .bind(&profile.zipcode)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Customer::try_from(row)
    }
}
