//! Loan application lifecycle
//!
//! The lifecycle engine (`service`), the pure field validation contract
//! (`validation`), and the status state machine (`status`).

mod service;
mod status;
mod validation;

pub use service::{LoanDetail, LoanError, LoanRef, LoanService, LoanSummary};
pub use status::{LoanStatus, UnknownStatus};
pub use validation::{validate_submission, ValidationError};

use serde::Deserialize;

/// Borrower-supplied fields for creating or fully replacing an application
///
/// Updates are never partial; the whole set is submitted and re-validated
/// every time.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanSubmission {
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
