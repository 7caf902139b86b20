//! Agriloan Backend Library
//!
//! This library exports the core modules for the agriloan backend server:
//! the loan-application lifecycle engine, the storage backends, and the
//! credential/session services around them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
