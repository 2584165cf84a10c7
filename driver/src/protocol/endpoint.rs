use reqwest::Method;

/// API calls issued by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    Login,
    CheckIn,
    CheckOut,
    Overtime,
    Reimbursement,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::CheckOut => Method::PATCH,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/login",
            Endpoint::CheckIn => "/api/attendance/checkin",
            Endpoint::CheckOut => "/api/attendance/checkout",
            Endpoint::Overtime => "/api/attendance/overtime",
            Endpoint::Reimbursement => "/api/reimbursement/submit",
        }
    }

    /// Short label for metrics and the summary table
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::CheckIn => "checkin",
            Endpoint::CheckOut => "checkout",
            Endpoint::Overtime => "overtime",
            Endpoint::Reimbursement => "reimbursement",
        }
    }
}
