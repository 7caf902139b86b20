//! Loan application status state machine
//!
//! Statuses move strictly forward: `Wait` -> `Process` -> `Approve`/`Reject`.
//! Terminal statuses never transition again and `Process` cannot be skipped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of a loan application
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Wait,
    Process,
    Approve,
    Reject,
}

impl LoanStatus {
    /// Status label as stored and rendered
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Wait => "wait",
            LoanStatus::Process => "process",
            LoanStatus::Approve => "approve",
            LoanStatus::Reject => "reject",
        }
    }

    /// An application still occupying the borrower's single active slot
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Wait | LoanStatus::Process)
    }

    /// Decided applications never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Approve | LoanStatus::Reject)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized status labels
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown loan status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for LoanStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait" => Ok(LoanStatus::Wait),
            "process" => Ok(LoanStatus::Process),
            "approve" => Ok(LoanStatus::Approve),
            "reject" => Ok(LoanStatus::Reject),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip() {
        for status in [
            LoanStatus::Wait,
            LoanStatus::Process,
            LoanStatus::Approve,
            LoanStatus::Reject,
        ] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_active_statuses() {
        assert!(LoanStatus::Wait.is_active());
        assert!(LoanStatus::Process.is_active());
        assert!(!LoanStatus::Approve.is_active());
        assert!(!LoanStatus::Reject.is_active());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!LoanStatus::Wait.is_terminal());
        assert!(!LoanStatus::Process.is_terminal());
        assert!(LoanStatus::Approve.is_terminal());
        assert!(LoanStatus::Reject.is_terminal());
    }
}
