//! Data models for the agriloan backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::loan::LoanStatus;

/// User model
///
/// The id is derived deterministically from the username at insertion time
/// and never changes afterwards.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    /// bcrypt hash, never the plain password
    pub password: String,
    pub is_officer: bool,
    pub created_date: DateTime<Utc>,
}

/// Loan application record
///
/// `officer_id` stays unset until an officer first touches the record and is
/// never cleared once set. `status` only moves forward through the
/// wait -> process -> approve/reject graph.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct LoanApplication {
    pub id: String,
    pub user_id: String,
    pub officer_id: Option<String>,
    pub full_name: String,
    pub birth_date: String,
    pub full_address: String,
    pub phone: String,
    pub id_card_url: String,
    pub other_business: String,
    pub status: LoanStatus,
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
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}
