//! Loan HTTP handlers
//!
//! Borrower- and officer-facing endpoints over the lifecycle engine. The
//! admin routes require a privileged session before the engine is invoked;
//! the engine re-checks the officer flag against the stored user record.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::Principal;
use crate::error::ApiError;
use crate::loan::{LoanDetail, LoanRef, LoanSubmission, LoanSummary};
use crate::state::AppState;

/// Query parameter naming the target application
#[derive(Debug, Deserialize)]
pub struct LoanIdQuery {
    pub id: String,
}

fn require_officer(principal: &Principal) -> Result<(), ApiError> {
    if !principal.is_officer {
        return Err(ApiError::Forbidden("officer only".to_string()));
    }
    Ok(())
}

/// GET /loan/getall - List the borrower's own applications
pub async fn get_user_loans(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<LoanSummary>>, ApiError> {
    let loans = state.loan_service.user_loans(&principal.user_id).await?;
    Ok(Json(loans))
}

/// GET /loan/get?id= - Fetch one of the borrower's own applications
pub async fn get_user_loan_detail(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
) -> Result<Json<LoanDetail>, ApiError> {
    let detail = state
        .loan_service
        .user_loan_detail(&query.id, &principal.user_id)
        .await?;
    Ok(Json(detail))
}

/// POST /loan/create - Submit a new application
pub async fn create_loan(
    State(state): State<AppState>,
    principal: Principal,
    Json(submission): Json<LoanSubmission>,
) -> Result<(StatusCode, Json<LoanRef>), ApiError> {
    let created = state
        .loan_service
        .create_loan(&principal.user_id, submission)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /loan/update?id= - Replace an application's fields
pub async fn update_loan(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
    Json(submission): Json<LoanSubmission>,
) -> Result<Json<LoanRef>, ApiError> {
    let updated = state
        .loan_service
        .update_loan(&query.id, &principal.user_id, submission)
        .await?;
    Ok(Json(updated))
}

/// DELETE /loan/delete?id= - Withdraw an application still in wait
pub async fn delete_loan(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
) -> Result<Json<LoanRef>, ApiError> {
    let removed = state
        .loan_service
        .delete_loan(&query.id, &principal.user_id)
        .await?;
    Ok(Json(removed))
}

/// GET /loan/getall/admin - List every application (officer)
pub async fn get_loans(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<LoanSummary>>, ApiError> {
    require_officer(&principal)?;
    let loans = state.loan_service.loans().await?;
    Ok(Json(loans))
}

/// GET /loan/get/admin?id= - Fetch any application (officer)
pub async fn get_loan_detail(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
) -> Result<Json<LoanDetail>, ApiError> {
    require_officer(&principal)?;
    let detail = state.loan_service.loan_detail(&query.id).await?;
    Ok(Json(detail))
}

/// PATCH /loan/proceedloan?id= - Take a waiting application into process
pub async fn proceed_loan(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
) -> Result<Json<LoanRef>, ApiError> {
    let updated = state
        .loan_service
        .proceed_loan(&query.id, &principal.user_id)
        .await?;
    Ok(Json(updated))
}

/// Request body for the approve/reject decision
#[derive(Debug, Deserialize)]
pub struct ApproveLoanRequest {
    pub is_approve: bool,
}

/// PATCH /loan/approveloan?id= - Decide a processed application
pub async fn approve_loan(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<LoanIdQuery>,
    Json(req): Json<ApproveLoanRequest>,
) -> Result<Json<LoanRef>, ApiError> {
    let updated = state
        .loan_service
        .approve_loan(&query.id, &principal.user_id, req.is_approve)
        .await?;
    Ok(Json(updated))
}
