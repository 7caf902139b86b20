//! Loan route definitions

use axum::Router;

use crate::handlers::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/loan/getall", axum::routing::get(get_user_loans))
        .route("/loan/get", axum::routing::get(get_user_loan_detail))
        .route("/loan/create", axum::routing::post(create_loan))
        .route("/loan/update", axum::routing::put(update_loan))
        .route("/loan/delete", axum::routing::delete(delete_loan))
        .route("/loan/getall/admin", axum::routing::get(get_loans))
        .route("/loan/get/admin", axum::routing::get(get_loan_detail))
        .route("/loan/proceedloan", axum::routing::patch(proceed_loan))
        .route("/loan/approveloan", axum::routing::patch(approve_loan))
}
