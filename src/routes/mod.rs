//! Route definitions for the agriloan API

mod auth;
mod loan;

pub use auth::auth_routes;
pub use loan::loan_routes;
