//! Storage abstraction for users and loan applications
//!
//! Two interchangeable backends implement the same contracts: a transient
//! in-process store behind a single reader/writer lock and a durable
//! PostgreSQL store where each logical operation runs in one transaction.
//! The lifecycle engine depends only on the traits and must not be able to
//! tell the backends apart.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use axum::async_trait;

use crate::models::{LoanApplication, User};

/// Error taxonomy shared by both backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    /// A storage-level uniqueness guard rejected the write. Raised by
    /// `insert_loan` when the owner already holds an active application and
    /// by `insert_user` on a duplicate username.
    #[error("storage constraint violated")]
    Conflict,

    #[error("storage failure: {0}")]
    Failure(String),
}

/// Fields needed to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// bcrypt hash
    pub password: String,
    pub is_officer: bool,
}

/// Borrower fields plus ownership for a new loan application
///
/// The store assigns the id, both timestamps, and forces status to `Wait`;
/// a draft carries none of them.
#[derive(Debug, Clone)]
pub struct LoanDraft {
    pub user_id: String,
    pub is_private_field: bool,
    pub exp_in_year: i64,
    pub active_field_number: i64,
    pub sow_seeds_per_cycle: i64,
    pub needed_fertilizer_per_cycle_in_kg: i64,
    pub estimated_yield_in_kg: i64,
    pub estimated_price_of_harvest_per_kg: i64,
    pub harvest_cycle_in_months: i64,
    pub loan_application_in_idr: i64,
    pub business_income_per_month_in_idr: i64,
    pub business_outcome_per_month_in_idr: i64,
    pub full_name: String,
    pub birth_date: String,
    pub full_address: String,
    pub phone: String,
    pub other_business: String,
    pub id_card_url: String,
}

/// Persistence of user identity and password hashes
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user, deriving its id from the username
    async fn insert_user(&self, user: NewUser) -> Result<User, StorageError>;

    async fn user_by_username(&self, username: &str) -> Result<User, StorageError>;

    async fn user_by_id(&self, id: &str) -> Result<User, StorageError>;
}

/// Persistence of loan application records
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn user(&self, user_id: &str) -> Result<User, StorageError>;

    /// Lookup scoped by owner; a record owned by someone else is
    /// indistinguishable from an absent one.
    async fn owned_loan(&self, loan_id: &str, user_id: &str)
        -> Result<LoanApplication, StorageError>;

    async fn owned_loans(&self, user_id: &str) -> Result<Vec<LoanApplication>, StorageError>;

    async fn loan(&self, loan_id: &str) -> Result<LoanApplication, StorageError>;

    async fn loans(&self) -> Result<Vec<LoanApplication>, StorageError>;

    /// Insert a draft, assigning id and timestamps and forcing `Wait`.
    /// Fails with `Conflict` when the owner already has an active loan.
    async fn insert_loan(&self, draft: LoanDraft) -> Result<LoanApplication, StorageError>;

    /// Full replace; refreshes the updated timestamp
    async fn update_loan(&self, loan_id: &str, record: LoanApplication)
        -> Result<(), StorageError>;

    /// Idempotent; removing an absent record is a no-op
    async fn remove_loan(&self, loan_id: &str) -> Result<(), StorageError>;
}

/// Deterministic user id from the username
pub(crate) fn user_id_for(username: &str) -> String {
    hex::encode(username.as_bytes())
}
