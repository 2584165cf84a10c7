//! Wire types for the attendance API
//!
//! Request bodies are built from the fixture configuration, and `Endpoint`
//! names each call the scenario makes together with its method and path.

mod endpoint;
mod messages;

pub use endpoint::Endpoint;
pub use messages::{
    AttendanceRequest, AuthResponse, CheckOutRequest, LoginRequest, OvertimeRequest,
    ReimbursementRequest,
};
