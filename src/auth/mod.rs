//! Registration and login
//!
//! Core business logic for password-based authentication against the
//! credential store. Session issuance lives in `crate::session`; this
//! module only answers "does this user exist / is this password correct".

mod service;

pub use service::{AuthError, AuthService};
