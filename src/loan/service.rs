//! Loan lifecycle engine
//!
//! Orchestrates validation, authorization, and storage for every loan
//! operation. Each mutating operation follows the same skeleton: resolve
//! the acting user, check privilege where the operation is officer-only,
//! resolve the target record, check its status, validate the fields, then
//! perform exactly one store write. Errors are surfaced immediately; there
//! are no retries and no partial mutation.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::models::{LoanApplication, User};
use crate::storage::{LoanDraft, LoanStore, StorageError};

use super::status::LoanStatus;
use super::validation::{validate_submission, ValidationError};
use super::LoanSubmission;

/// Errors raised by the lifecycle engine
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("user not found")]
    UserNotFound,

    #[error("user loan not found")]
    LoanNotFound,

    #[error("officer only")]
    OfficerOnly,

    #[error("already have processed loan")]
    ActiveLoanExists,

    #[error("cannot modify processed loan")]
    ModifyProcessedLoan,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl LoanError {
    fn from_user_lookup(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => LoanError::UserNotFound,
            other => LoanError::Storage(other.to_string()),
        }
    }

    fn from_loan_lookup(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => LoanError::LoanNotFound,
            other => LoanError::Storage(other.to_string()),
        }
    }

    fn from_store(err: StorageError) -> Self {
        LoanError::Storage(err.to_string())
    }
}

/// One row in a loan listing
#[derive(Debug, Serialize)]
pub struct LoanSummary {
    pub loan_id: String,
    pub user_id: String,
    pub full_name: String,
    pub loan_status: String,
    pub loan_created_date: String,
}

impl LoanSummary {
    fn from_record(record: &LoanApplication) -> Self {
        Self {
            loan_id: record.id.clone(),
            user_id: record.user_id.clone(),
            full_name: record.full_name.clone(),
            loan_status: record.status.to_string(),
            loan_created_date: record.created_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Full public projection of an application
#[derive(Debug, Serialize)]
pub struct LoanDetail {
    pub loan_id: String,
    pub user_id: String,
    pub officer_id: Option<String>,
    pub full_name: String,
    pub birth_date: String,
    pub full_address: String,
    pub phone: String,
    pub other_business: String,
    pub id_card_url: String,
    pub status: String,
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
}

impl LoanDetail {
    fn from_record(record: &LoanApplication) -> Self {
        Self {
            loan_id: record.id.clone(),
            user_id: record.user_id.clone(),
            officer_id: record.officer_id.clone(),
            full_name: record.full_name.clone(),
            birth_date: record.birth_date.clone(),
            full_address: record.full_address.clone(),
            phone: record.phone.clone(),
            other_business: record.other_business.clone(),
            id_card_url: record.id_card_url.clone(),
            status: record.status.to_string(),
            is_private_field: record.is_private_field,
            exp_in_year: record.exp_in_year,
            active_field_number: record.active_field_number,
            sow_seeds_per_cycle: record.sow_seeds_per_cycle,
            needed_fertilizer_per_cycle_in_kg: record.needed_fertilizer_per_cycle_in_kg,
            estimated_yield_in_kg: record.estimated_yield_in_kg,
            estimated_price_of_harvest_per_kg: record.estimated_price_of_harvest_per_kg,
            harvest_cycle_in_months: record.harvest_cycle_in_months,
            loan_application_in_idr: record.loan_application_in_idr,
            business_income_per_month_in_idr: record.business_income_per_month_in_idr,
            business_outcome_per_month_in_idr: record.business_outcome_per_month_in_idr,
        }
    }
}

/// Identifier of a created or mutated application
#[derive(Debug, Serialize)]
pub struct LoanRef {
    pub id: String,
}

/// Loan lifecycle service, backend-agnostic over the store
pub struct LoanService {
    store: Arc<dyn LoanStore>,
}

impl LoanService {
    pub fn new(store: Arc<dyn LoanStore>) -> Self {
        Self { store }
    }

    async fn acting_user(&self, user_id: &str) -> Result<User, LoanError> {
        self.store
            .user(user_id)
            .await
            .map_err(LoanError::from_user_lookup)
    }

    async fn acting_officer(&self, user_id: &str) -> Result<User, LoanError> {
        let user = self.acting_user(user_id).await?;
        if !user.is_officer {
            return Err(LoanError::OfficerOnly);
        }
        Ok(user)
    }

    /// List the borrower's own applications
    pub async fn user_loans(&self, user_id: &str) -> Result<Vec<LoanSummary>, LoanError> {
        self.acting_user(user_id).await?;

        let loans = self
            .store
            .owned_loans(user_id)
            .await
            .map_err(LoanError::from_store)?;

        Ok(loans.iter().map(LoanSummary::from_record).collect())
    }

    /// Fetch one of the borrower's own applications
    pub async fn user_loan_detail(
        &self,
        loan_id: &str,
        user_id: &str,
    ) -> Result<LoanDetail, LoanError> {
        self.acting_user(user_id).await?;

        let loan = self
            .store
            .owned_loan(loan_id, user_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        Ok(LoanDetail::from_record(&loan))
    }

    /// Submit a new application; it always starts in `Wait`
    pub async fn create_loan(
        &self,
        user_id: &str,
        submission: LoanSubmission,
    ) -> Result<LoanRef, LoanError> {
        validate_submission(&submission)?;

        self.acting_user(user_id).await?;

        let existing = self
            .store
            .owned_loans(user_id)
            .await
            .map_err(LoanError::from_store)?;
        if existing.iter().any(|loan| loan.status.is_active()) {
            return Err(LoanError::ActiveLoanExists);
        }

        let record = self
            .store
            .insert_loan(draft_from(user_id, submission))
            .await
            .map_err(|err| match err {
                // The storage-level uniqueness guard caught a concurrent
                // create that slipped past the check above.
                StorageError::Conflict => LoanError::ActiveLoanExists,
                other => LoanError::Storage(other.to_string()),
            })?;

        Ok(LoanRef { id: record.id })
    }

    /// Replace every borrower-editable field; only allowed while `Wait`
    pub async fn update_loan(
        &self,
        loan_id: &str,
        user_id: &str,
        submission: LoanSubmission,
    ) -> Result<LoanRef, LoanError> {
        validate_submission(&submission)?;

        self.acting_user(user_id).await?;

        let mut loan = self
            .store
            .owned_loan(loan_id, user_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        if loan.status != LoanStatus::Wait {
            return Err(LoanError::ModifyProcessedLoan);
        }

        loan.is_private_field = submission.is_private_field;
        loan.exp_in_year = submission.exp_in_year;
        loan.active_field_number = submission.active_field_number;
        loan.sow_seeds_per_cycle = submission.sow_seeds_per_cycle;
        loan.needed_fertilizer_per_cycle_in_kg = submission.needed_fertilizer_per_cycle_in_kg;
        loan.estimated_yield_in_kg = submission.estimated_yield_in_kg;
        loan.estimated_price_of_harvest_per_kg = submission.estimated_price_of_harvest_per_kg;
        loan.harvest_cycle_in_months = submission.harvest_cycle_in_months;
        loan.loan_application_in_idr = submission.loan_application_in_idr;
        loan.business_income_per_month_in_idr = submission.business_income_per_month_in_idr;
        loan.business_outcome_per_month_in_idr = submission.business_outcome_per_month_in_idr;
        loan.full_name = submission.full_name;
        loan.birth_date = submission.birth_date;
        loan.full_address = submission.full_address;
        loan.phone = submission.phone;
        loan.other_business = submission.other_business;
        loan.id_card_url = submission.id_card_url;

        self.store
            .update_loan(loan_id, loan)
            .await
            .map_err(LoanError::from_store)?;

        Ok(LoanRef {
            id: loan_id.to_string(),
        })
    }

    /// Delete an application; only the owner, only while `Wait`
    pub async fn delete_loan(&self, loan_id: &str, user_id: &str) -> Result<LoanRef, LoanError> {
        self.acting_user(user_id).await?;

        let loan = self
            .store
            .owned_loan(loan_id, user_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        if loan.status != LoanStatus::Wait {
            return Err(LoanError::ModifyProcessedLoan);
        }

        self.store
            .remove_loan(loan_id)
            .await
            .map_err(LoanError::from_store)?;

        Ok(LoanRef {
            id: loan_id.to_string(),
        })
    }

    /// List every application (officer-facing)
    pub async fn loans(&self) -> Result<Vec<LoanSummary>, LoanError> {
        let loans = self.store.loans().await.map_err(LoanError::from_store)?;
        Ok(loans.iter().map(LoanSummary::from_record).collect())
    }

    /// Fetch any application unscoped (officer-facing)
    pub async fn loan_detail(&self, loan_id: &str) -> Result<LoanDetail, LoanError> {
        let loan = self
            .store
            .loan(loan_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        Ok(LoanDetail::from_record(&loan))
    }

    /// Move a `Wait` application into `Process`, claiming it for the officer
    pub async fn proceed_loan(&self, loan_id: &str, user_id: &str) -> Result<LoanRef, LoanError> {
        let officer = self.acting_officer(user_id).await?;

        let mut loan = self
            .store
            .loan(loan_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        if loan.status != LoanStatus::Wait {
            return Err(LoanError::ModifyProcessedLoan);
        }

        loan.status = LoanStatus::Process;
        loan.officer_id = Some(officer.id);

        self.store
            .update_loan(loan_id, loan)
            .await
            .map_err(LoanError::from_store)?;

        Ok(LoanRef {
            id: loan_id.to_string(),
        })
    }

    /// Decide a `Process` application: approve or reject, terminally
    pub async fn approve_loan(
        &self,
        loan_id: &str,
        user_id: &str,
        is_approve: bool,
    ) -> Result<LoanRef, LoanError> {
        let officer = self.acting_officer(user_id).await?;

        let mut loan = self
            .store
            .loan(loan_id)
            .await
            .map_err(LoanError::from_loan_lookup)?;

        if loan.status != LoanStatus::Process {
            return Err(LoanError::ModifyProcessedLoan);
        }

        if loan.officer_id.is_none() {
            loan.officer_id = Some(officer.id);
        }
        loan.status = if is_approve {
            LoanStatus::Approve
        } else {
            LoanStatus::Reject
        };

        self.store
            .update_loan(loan_id, loan)
            .await
            .map_err(LoanError::from_store)?;

        Ok(LoanRef {
            id: loan_id.to_string(),
        })
    }
}

fn draft_from(user_id: &str, submission: LoanSubmission) -> LoanDraft {
    LoanDraft {
        user_id: user_id.to_string(),
        is_private_field: submission.is_private_field,
        exp_in_year: submission.exp_in_year,
        active_field_number: submission.active_field_number,
        sow_seeds_per_cycle: submission.sow_seeds_per_cycle,
        needed_fertilizer_per_cycle_in_kg: submission.needed_fertilizer_per_cycle_in_kg,
        estimated_yield_in_kg: submission.estimated_yield_in_kg,
        estimated_price_of_harvest_per_kg: submission.estimated_price_of_harvest_per_kg,
        harvest_cycle_in_months: submission.harvest_cycle_in_months,
        loan_application_in_idr: submission.loan_application_in_idr,
        business_income_per_month_in_idr: submission.business_income_per_month_in_idr,
        business_outcome_per_month_in_idr: submission.business_outcome_per_month_in_idr,
        full_name: submission.full_name,
        birth_date: submission.birth_date,
        full_address: submission.full_address,
        phone: submission.phone,
        other_business: submission.other_business,
        id_card_url: submission.id_card_url,
    }
}
