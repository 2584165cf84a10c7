//! The attendance load scenario
//!
//! This module provides:
//! - `Check` for the named status assertions
//! - `VirtualUser` running the four-call iteration loop
//! - `LoadRunner` for setup, VU fan-out and result collection

mod check;
mod runner;
mod vu;

pub use check::Check;
pub use runner::{LoadRunner, SetupError};
pub use vu::{VirtualUser, VuEvent, VuLimits};
