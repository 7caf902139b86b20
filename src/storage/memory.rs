//! Transient in-process storage backend
//!
//! Both tables sit behind one coarse reader/writer lock so every operation,
//! including the active-loan check inside `insert_loan`, is a single
//! critical section.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::loan::LoanStatus;
use crate::models::{LoanApplication, User};

use super::{user_id_for, CredentialStore, LoanDraft, LoanStore, NewUser, StorageError};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    loans: HashMap<String, LoanApplication>,
}

/// In-memory store backed by hash maps under a single lock
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.inner
            .read()
            .map_err(|_| StorageError::Failure("storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.inner
            .write()
            .map_err(|_| StorageError::Failure("storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tables = self.write()?;

        let id = user_id_for(&user.username);
        if tables.users.contains_key(&id) {
            return Err(StorageError::Conflict);
        }

        let record = User {
            id: id.clone(),
            username: user.username,
            password: user.password,
            is_officer: user.is_officer,
            created_date: Utc::now(),
        };
        tables.users.insert(id, record.clone());

        Ok(record)
    }

    async fn user_by_username(&self, username: &str) -> Result<User, StorageError> {
        let tables = self.read()?;
        tables
            .users
            .get(&user_id_for(username))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn user_by_id(&self, id: &str) -> Result<User, StorageError> {
        let tables = self.read()?;
        tables.users.get(id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn user(&self, user_id: &str) -> Result<User, StorageError> {
        self.user_by_id(user_id).await
    }

    async fn owned_loan(
        &self,
        loan_id: &str,
        user_id: &str,
    ) -> Result<LoanApplication, StorageError> {
        let tables = self.read()?;
        tables
            .loans
            .get(loan_id)
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn owned_loans(&self, user_id: &str) -> Result<Vec<LoanApplication>, StorageError> {
        let tables = self.read()?;
        let mut loans: Vec<LoanApplication> = tables
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.created_date.cmp(&b.created_date));
        Ok(loans)
    }

    async fn loan(&self, loan_id: &str) -> Result<LoanApplication, StorageError> {
        let tables = self.read()?;
        tables
            .loans
            .get(loan_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn loans(&self) -> Result<Vec<LoanApplication>, StorageError> {
        let tables = self.read()?;
        let mut loans: Vec<LoanApplication> = tables.loans.values().cloned().collect();
        loans.sort_by(|a, b| a.created_date.cmp(&b.created_date));
        Ok(loans)
    }

    async fn insert_loan(&self, draft: LoanDraft) -> Result<LoanApplication, StorageError> {
        let mut tables = self.write()?;

        // The one-active-loan invariant is enforced here, under the write
        // lock, so concurrent creates cannot both slip past the engine's
        // read-then-check.
        let has_active = tables
            .loans
            .values()
            .any(|loan| loan.user_id == draft.user_id && loan.status.is_active());
        if has_active {
            return Err(StorageError::Conflict);
        }

        let now = Utc::now();
        let record = LoanApplication {
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            officer_id: None,
            full_name: draft.full_name,
            birth_date: draft.birth_date,
            full_address: draft.full_address,
            phone: draft.phone,
            id_card_url: draft.id_card_url,
            other_business: draft.other_business,
            status: LoanStatus::Wait,
            is_private_field: draft.is_private_field,
            exp_in_year: draft.exp_in_year,
            active_field_number: draft.active_field_number,
            sow_seeds_per_cycle: draft.sow_seeds_per_cycle,
            needed_fertilizer_per_cycle_in_kg: draft.needed_fertilizer_per_cycle_in_kg,
            estimated_yield_in_kg: draft.estimated_yield_in_kg,
            estimated_price_of_harvest_per_kg: draft.estimated_price_of_harvest_per_kg,
            harvest_cycle_in_months: draft.harvest_cycle_in_months,
            loan_application_in_idr: draft.loan_application_in_idr,
            business_income_per_month_in_idr: draft.business_income_per_month_in_idr,
            business_outcome_per_month_in_idr: draft.business_outcome_per_month_in_idr,
            created_date: now,
            updated_date: now,
        };
        tables.loans.insert(record.id.clone(), record.clone());

        Ok(record)
    }

    async fn update_loan(
        &self,
        loan_id: &str,
        mut record: LoanApplication,
    ) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        if !tables.loans.contains_key(loan_id) {
            return Err(StorageError::NotFound);
        }

        // Keep the map key authoritative so the stored id can never diverge
        // from it, mirroring the WHERE clause of the durable backend.
        record.id = loan_id.to_string();
        record.updated_date = Utc::now();
        tables.loans.insert(loan_id.to_string(), record);

        Ok(())
    }

    async fn remove_loan(&self, loan_id: &str) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        tables.loans.remove(loan_id);
        Ok(())
    }
}
