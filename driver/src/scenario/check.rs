use reqwest::StatusCode;

use crate::client::ApiError;
use crate::protocol::Endpoint;

/// Named assertion evaluated against each scenario response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    CheckIn,
    CheckOut,
    Overtime,
    Reimbursement,
}

impl Check {
    /// Checks in the order an iteration evaluates them
    pub const ALL: [Check; 4] = [
        Check::CheckIn,
        Check::CheckOut,
        Check::Overtime,
        Check::Reimbursement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::CheckIn => "check-in success",
            Check::CheckOut => "check-out success",
            Check::Overtime => "overtime requested",
            Check::Reimbursement => "reimbursement submitted",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Check::CheckIn => Endpoint::CheckIn,
            Check::CheckOut => Endpoint::CheckOut,
            Check::Overtime => Endpoint::Overtime,
            Check::Reimbursement => Endpoint::Reimbursement,
        }
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        match self {
            Check::CheckIn => 0,
            Check::CheckOut => 1,
            Check::Overtime => 2,
            Check::Reimbursement => 3,
        }
    }

    /// Whether a response status satisfies the check
    ///
    /// Check-out also accepts 409 (already checked out).
    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            Check::CheckOut => status == StatusCode::OK || status == StatusCode::CONFLICT,
            _ => status == StatusCode::OK,
        }
    }

    /// A call that produced no status fails the check
    pub fn evaluate(&self, result: &Result<StatusCode, ApiError>) -> bool {
        match result {
            Ok(status) => self.accepts(*status),
            Err(_) => false,
        }
    }
}
