//! Loan Lifecycle Tests
//!
//! These tests exercise the lifecycle engine and the storage contract over
//! the in-memory backend: the status state machine, the authorization
//! gates, the one-active-loan invariant, and owner scoping.

use std::sync::Arc;

use agriloan_backend::auth::AuthService;
use agriloan_backend::loan::{
    LoanError, LoanService, LoanStatus, LoanSubmission, ValidationError,
};
use agriloan_backend::storage::{LoanDraft, LoanStore, MemoryStore, StorageError};

fn valid_submission() -> LoanSubmission {
    LoanSubmission {
        is_private_field: false,
        exp_in_year: 3,
        active_field_number: 2,
        sow_seeds_per_cycle: 100,
        needed_fertilizer_per_cycle_in_kg: 50,
        estimated_yield_in_kg: 800,
        estimated_price_of_harvest_per_kg: 12_000,
        harvest_cycle_in_months: 4,
        loan_application_in_idr: 5_000_000,
        business_income_per_month_in_idr: 2_000_000,
        business_outcome_per_month_in_idr: 1_500_000,
        full_name: "Sri Rahayu".to_string(),
        birth_date: "1988-04-17".to_string(),
        full_address: "Jl. Raya Bogor KM 30".to_string(),
        phone: "081234567890".to_string(),
        other_business: String::new(),
        id_card_url: "file/id-card.jpg".to_string(),
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    loans: LoanService,
    borrower_id: String,
    officer_id: String,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let auth = AuthService::new(store.clone());
    let loans = LoanService::new(store.clone());

    let borrower = auth
        .register("borrower", "secret", false)
        .await
        .expect("borrower registration");
    let officer = auth
        .register("officer", "secret", true)
        .await
        .expect("officer registration");

    Fixture {
        store,
        loans,
        borrower_id: borrower.id,
        officer_id: officer.id,
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_loan_starts_in_wait() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .expect("create should succeed");

    let detail = fx
        .loans
        .user_loan_detail(&created.id, &fx.borrower_id)
        .await
        .expect("detail should resolve");
    assert_eq!(detail.status, "wait");
    assert_eq!(detail.officer_id, None);
    assert_eq!(detail.user_id, fx.borrower_id);
}

#[tokio::test]
async fn test_create_with_minimal_positive_fields_succeeds() {
    let fx = fixture().await;

    let mut submission = valid_submission();
    submission.exp_in_year = 1;
    submission.active_field_number = 1;
    submission.sow_seeds_per_cycle = 1;
    submission.needed_fertilizer_per_cycle_in_kg = 1;
    submission.estimated_yield_in_kg = 1;
    submission.estimated_price_of_harvest_per_kg = 1;
    submission.harvest_cycle_in_months = 1;
    submission.loan_application_in_idr = 1;
    submission.business_income_per_month_in_idr = 1;
    submission.business_outcome_per_month_in_idr = 1;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, submission)
        .await
        .expect("minimal positive fields should pass");

    let detail = fx
        .loans
        .user_loan_detail(&created.id, &fx.borrower_id)
        .await
        .expect("detail should resolve");
    assert_eq!(detail.status, "wait");
    assert_eq!(detail.exp_in_year, 1);
    assert_eq!(detail.loan_application_in_idr, 1);
}

#[tokio::test]
async fn test_create_rejects_missing_required_field() {
    let fx = fixture().await;

    let mut submission = valid_submission();
    submission.exp_in_year = 0;

    let err = fx
        .loans
        .create_loan(&fx.borrower_id, submission)
        .await
        .expect_err("zero experience should fail validation");
    assert!(matches!(
        err,
        LoanError::Validation(ValidationError::ExpInYearRequired)
    ));

    // Nothing was persisted.
    let listed = fx.loans.user_loans(&fx.borrower_id).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_create_rejects_unknown_principal() {
    let fx = fixture().await;

    let err = fx
        .loans
        .create_loan("no-such-user", valid_submission())
        .await
        .expect_err("unknown user should fail");
    assert!(matches!(err, LoanError::UserNotFound));
}

#[tokio::test]
async fn test_second_active_application_conflicts() {
    let fx = fixture().await;

    fx.loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .expect("first create");

    let err = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .expect_err("second create while one waits");
    assert!(matches!(err, LoanError::ActiveLoanExists));
}

#[tokio::test]
async fn test_active_slot_frees_after_decision() {
    let fx = fixture().await;

    let first = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    // Still active while in process.
    fx.loans
        .proceed_loan(&first.id, &fx.officer_id)
        .await
        .unwrap();
    let err = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .expect_err("create while one is in process");
    assert!(matches!(err, LoanError::ActiveLoanExists));

    // A rejected application no longer blocks a new one.
    fx.loans
        .approve_loan(&first.id, &fx.officer_id, false)
        .await
        .unwrap();
    fx.loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .expect("create after rejection should succeed");
}

// ============================================================================
// Update and delete
// ============================================================================

#[tokio::test]
async fn test_update_replaces_all_fields_while_wait() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    let mut submission = valid_submission();
    submission.full_name = "Sri R. Handayani".to_string();
    submission.loan_application_in_idr = 7_500_000;
    submission.id_card_url = "file/id-card-v2.jpg".to_string();

    fx.loans
        .update_loan(&created.id, &fx.borrower_id, submission)
        .await
        .expect("update while wait");

    let detail = fx
        .loans
        .user_loan_detail(&created.id, &fx.borrower_id)
        .await
        .unwrap();
    assert_eq!(detail.full_name, "Sri R. Handayani");
    assert_eq!(detail.loan_application_in_idr, 7_500_000);
    assert_eq!(detail.id_card_url, "file/id-card-v2.jpg");
    assert_eq!(detail.status, "wait");
}

#[tokio::test]
async fn test_update_rejected_once_processing_started() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();

    let err = fx
        .loans
        .update_loan(&created.id, &fx.borrower_id, valid_submission())
        .await
        .expect_err("update after proceed");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));
}

#[tokio::test]
async fn test_update_revalidates_fields() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    let mut submission = valid_submission();
    submission.phone = "08123".to_string();

    let err = fx
        .loans
        .update_loan(&created.id, &fx.borrower_id, submission)
        .await
        .expect_err("short phone should fail");
    assert!(matches!(
        err,
        LoanError::Validation(ValidationError::PhoneMin10)
    ));
}

#[tokio::test]
async fn test_delete_only_while_wait() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .delete_loan(&created.id, &fx.borrower_id)
        .await
        .expect("delete while wait");

    let err = fx
        .loans
        .user_loan_detail(&created.id, &fx.borrower_id)
        .await
        .expect_err("deleted loan is gone");
    assert!(matches!(err, LoanError::LoanNotFound));
}

#[tokio::test]
async fn test_delete_rejected_once_processing_started() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();

    let err = fx
        .loans
        .delete_loan(&created.id, &fx.borrower_id)
        .await
        .expect_err("delete after proceed");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));

    // The record survives as an audit trail.
    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "process");
}

// ============================================================================
// Officer transitions
// ============================================================================

#[tokio::test]
async fn test_proceed_moves_wait_to_process_and_claims_officer() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .expect("proceed by officer");

    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "process");
    assert_eq!(detail.officer_id.as_deref(), Some(fx.officer_id.as_str()));
}

#[tokio::test]
async fn test_proceed_forbidden_for_non_officer() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    let err = fx
        .loans
        .proceed_loan(&created.id, &fx.borrower_id)
        .await
        .expect_err("borrower may not proceed");
    assert!(matches!(err, LoanError::OfficerOnly));

    // Record unchanged.
    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "wait");
    assert_eq!(detail.officer_id, None);
}

#[tokio::test]
async fn test_privilege_is_checked_before_state() {
    let fx = fixture().await;

    // Even with a bogus loan id a non-officer gets Forbidden, not NotFound.
    let err = fx
        .loans
        .proceed_loan("no-such-loan", &fx.borrower_id)
        .await
        .expect_err("non-officer");
    assert!(matches!(err, LoanError::OfficerOnly));

    let err = fx
        .loans
        .approve_loan("no-such-loan", &fx.borrower_id, true)
        .await
        .expect_err("non-officer");
    assert!(matches!(err, LoanError::OfficerOnly));
}

#[tokio::test]
async fn test_proceed_conflicts_outside_wait() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();

    let err = fx
        .loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .expect_err("proceed twice");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));

    fx.loans
        .approve_loan(&created.id, &fx.officer_id, true)
        .await
        .unwrap();
    let err = fx
        .loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .expect_err("proceed from terminal state");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));
}

#[tokio::test]
async fn test_approve_conflicts_outside_process() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    // Cannot skip the process stage.
    let err = fx
        .loans
        .approve_loan(&created.id, &fx.officer_id, true)
        .await
        .expect_err("approve straight from wait");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));

    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "wait");
}

#[tokio::test]
async fn test_approve_true_yields_approve() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();
    fx.loans
        .approve_loan(&created.id, &fx.officer_id, true)
        .await
        .unwrap();

    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "approve");
}

#[tokio::test]
async fn test_approve_false_yields_reject() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();
    fx.loans
        .approve_loan(&created.id, &fx.officer_id, false)
        .await
        .unwrap();

    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "reject");
}

#[tokio::test]
async fn test_terminal_states_never_transition() {
    let fx = fixture().await;

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .proceed_loan(&created.id, &fx.officer_id)
        .await
        .unwrap();
    fx.loans
        .approve_loan(&created.id, &fx.officer_id, true)
        .await
        .unwrap();

    let err = fx
        .loans
        .approve_loan(&created.id, &fx.officer_id, false)
        .await
        .expect_err("re-deciding a terminal loan");
    assert!(matches!(err, LoanError::ModifyProcessedLoan));

    let detail = fx.loans.loan_detail(&created.id).await.unwrap();
    assert_eq!(detail.status, "approve");
}

// ============================================================================
// Scoping and listings
// ============================================================================

#[tokio::test]
async fn test_owned_lookup_hides_other_users_records() {
    let fx = fixture().await;
    let auth = AuthService::new(fx.store.clone());
    let other = auth.register("other", "secret", false).await.unwrap();

    let created = fx
        .loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();

    // Someone else's record is indistinguishable from an absent one.
    let err = fx
        .loans
        .user_loan_detail(&created.id, &other.id)
        .await
        .expect_err("loan belongs to another user");
    assert!(matches!(err, LoanError::LoanNotFound));
}

#[tokio::test]
async fn test_officer_listing_spans_all_borrowers() {
    let fx = fixture().await;
    let auth = AuthService::new(fx.store.clone());
    let other = auth.register("other", "secret", false).await.unwrap();

    fx.loans
        .create_loan(&fx.borrower_id, valid_submission())
        .await
        .unwrap();
    fx.loans
        .create_loan(&other.id, valid_submission())
        .await
        .unwrap();

    let all = fx.loans.loans().await.unwrap();
    assert_eq!(all.len(), 2);

    let own = fx.loans.user_loans(&fx.borrower_id).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].user_id, fx.borrower_id);
    assert_eq!(own[0].loan_status, "wait");
}

// ============================================================================
// Storage contract
// ============================================================================

fn draft_for(user_id: &str) -> LoanDraft {
    let submission = valid_submission();
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

#[tokio::test]
async fn test_insert_then_get_round_trips() {
    let fx = fixture().await;

    let inserted = fx
        .store
        .insert_loan(draft_for(&fx.borrower_id))
        .await
        .expect("insert");
    let fetched = fx.store.loan(&inserted.id).await.expect("fetch");

    assert_eq!(fetched, inserted);
    assert!(!fetched.id.is_empty());
    assert_eq!(fetched.status, LoanStatus::Wait);
    assert_eq!(fetched.created_date, fetched.updated_date);
    assert_eq!(fetched.full_name, "Sri Rahayu");
    assert_eq!(fetched.estimated_yield_in_kg, 800);
    assert_eq!(fetched.estimated_price_of_harvest_per_kg, 12_000);
}

#[tokio::test]
async fn test_store_guards_one_active_loan_per_user() {
    let fx = fixture().await;

    fx.store
        .insert_loan(draft_for(&fx.borrower_id))
        .await
        .expect("first insert");

    // Even bypassing the engine's check, the store refuses a second active
    // application for the same owner.
    let err = fx
        .store
        .insert_loan(draft_for(&fx.borrower_id))
        .await
        .expect_err("second active insert");
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn test_update_keeps_record_id_authoritative() {
    let fx = fixture().await;

    let inserted = fx
        .store
        .insert_loan(draft_for(&fx.borrower_id))
        .await
        .unwrap();

    // A caller passing a record with a mismatched id must not be able to
    // desynchronize the stored id from the lookup key.
    let mut tampered = inserted.clone();
    tampered.id = "someone-elses-id".to_string();
    fx.store.update_loan(&inserted.id, tampered).await.unwrap();

    let fetched = fx.store.loan(&inserted.id).await.unwrap();
    assert_eq!(fetched.id, inserted.id);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let fx = fixture().await;

    let inserted = fx
        .store
        .insert_loan(draft_for(&fx.borrower_id))
        .await
        .unwrap();
    fx.store.remove_loan(&inserted.id).await.expect("remove");
    fx.store
        .remove_loan(&inserted.id)
        .await
        .expect("removing an absent record is a no-op");
}
