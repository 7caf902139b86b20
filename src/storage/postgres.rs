//! Durable PostgreSQL storage backend
//!
//! Every logical operation runs inside a single database transaction. The
//! one-active-loan invariant is backed by a partial unique index on
//! `loan_applications (user_id) WHERE status IN ('wait', 'process')`;
//! violations surface as `StorageError::Conflict`.

use axum::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::loan::LoanStatus;
use crate::models::{LoanApplication, User};

use super::{user_id_for, CredentialStore, LoanDraft, LoanStore, NewUser, StorageError};

const LOAN_COLUMNS: &str = "id, user_id, officer_id, full_name, birth_date, full_address, \
     phone, id_card_url, other_business, status, is_private_field, exp_in_year, \
     active_field_number, sow_seeds_per_cycle, needed_fertilizer_per_cycle_in_kg, \
     estimated_yield_in_kg, estimated_price_of_harvest_per_kg, harvest_cycle_in_months, \
     loan_application_in_idr, business_income_per_month_in_idr, \
     business_outcome_per_month_in_idr, created_date, updated_date";

fn map_sqlx_err(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StorageError::Conflict
        }
        _ => StorageError::Failure(err.to_string()),
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let record = User {
            id: user_id_for(&user.username),
            username: user.username,
            password: user.password,
            is_officer: user.is_officer,
            created_date: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, password, is_officer, created_date)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.password)
        .bind(record.is_officer)
        .bind(record.created_date)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(record)
    }

    async fn user_by_username(&self, username: &str) -> Result<User, StorageError> {
        // The id is a pure function of the username, so this stays a
        // primary-key lookup.
        self.user_by_id(&user_id_for(username)).await
    }

    async fn user_by_id(&self, id: &str) -> Result<User, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, is_officer, created_date
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(user)
    }
}

#[async_trait]
impl LoanStore for PgStore {
    async fn user(&self, user_id: &str) -> Result<User, StorageError> {
        self.user_by_id(user_id).await
    }

    async fn owned_loan(
        &self,
        loan_id: &str,
        user_id: &str,
    ) -> Result<LoanApplication, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loan_applications WHERE id = $1 AND user_id = $2"
        );
        let loan = sqlx::query_as::<_, LoanApplication>(&sql)
            .bind(loan_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(loan)
    }

    async fn owned_loans(&self, user_id: &str) -> Result<Vec<LoanApplication>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loan_applications
             WHERE user_id = $1 ORDER BY created_date"
        );
        let loans = sqlx::query_as::<_, LoanApplication>(&sql)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(loans)
    }

    async fn loan(&self, loan_id: &str) -> Result<LoanApplication, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!("SELECT {LOAN_COLUMNS} FROM loan_applications WHERE id = $1");
        let loan = sqlx::query_as::<_, LoanApplication>(&sql)
            .bind(loan_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(loan)
    }

    async fn loans(&self) -> Result<Vec<LoanApplication>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let sql = format!("SELECT {LOAN_COLUMNS} FROM loan_applications ORDER BY created_date");
        let loans = sqlx::query_as::<_, LoanApplication>(&sql)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(loans)
    }

    async fn insert_loan(&self, draft: LoanDraft) -> Result<LoanApplication, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

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

        let sql = format!(
            "INSERT INTO loan_applications ({LOAN_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22, $23)"
        );
        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&record.user_id)
            .bind(&record.officer_id)
            .bind(&record.full_name)
            .bind(&record.birth_date)
            .bind(&record.full_address)
            .bind(&record.phone)
            .bind(&record.id_card_url)
            .bind(&record.other_business)
            .bind(record.status)
            .bind(record.is_private_field)
            .bind(record.exp_in_year)
            .bind(record.active_field_number)
            .bind(record.sow_seeds_per_cycle)
            .bind(record.needed_fertilizer_per_cycle_in_kg)
            .bind(record.estimated_yield_in_kg)
            .bind(record.estimated_price_of_harvest_per_kg)
            .bind(record.harvest_cycle_in_months)
            .bind(record.loan_application_in_idr)
            .bind(record.business_income_per_month_in_idr)
            .bind(record.business_outcome_per_month_in_idr)
            .bind(record.created_date)
            .bind(record.updated_date)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(record)
    }

    async fn update_loan(
        &self,
        loan_id: &str,
        record: LoanApplication,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let result = sqlx::query(
            "UPDATE loan_applications SET
                officer_id = $1,
                full_name = $2,
                birth_date = $3,
                full_address = $4,
                phone = $5,
                id_card_url = $6,
                other_business = $7,
                status = $8,
                is_private_field = $9,
                exp_in_year = $10,
                active_field_number = $11,
                sow_seeds_per_cycle = $12,
                needed_fertilizer_per_cycle_in_kg = $13,
                estimated_yield_in_kg = $14,
                estimated_price_of_harvest_per_kg = $15,
                harvest_cycle_in_months = $16,
                loan_application_in_idr = $17,
                business_income_per_month_in_idr = $18,
                business_outcome_per_month_in_idr = $19,
                updated_date = $20
             WHERE id = $21",
        )
        .bind(&record.officer_id)
        .bind(&record.full_name)
        .bind(&record.birth_date)
        .bind(&record.full_address)
        .bind(&record.phone)
        .bind(&record.id_card_url)
        .bind(&record.other_business)
        .bind(record.status)
        .bind(record.is_private_field)
        .bind(record.exp_in_year)
        .bind(record.active_field_number)
        .bind(record.sow_seeds_per_cycle)
        .bind(record.needed_fertilizer_per_cycle_in_kg)
        .bind(record.estimated_yield_in_kg)
        .bind(record.estimated_price_of_harvest_per_kg)
        .bind(record.harvest_cycle_in_months)
        .bind(record.loan_application_in_idr)
        .bind(record.business_income_per_month_in_idr)
        .bind(record.business_outcome_per_month_in_idr)
        .bind(Utc::now())
        .bind(loan_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn remove_loan(&self, loan_id: &str) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        sqlx::query("DELETE FROM loan_applications WHERE id = $1")
            .bind(loan_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;

        Ok(())
    }
}
