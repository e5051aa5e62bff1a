//! Gateway test support utilities
//!
//! Shared helpers for the gateway's unit and integration tests: one-time
//! logging initialization and assertions over the problem-details error
//! contract.

pub mod logging;
pub mod problem_details;

pub use problem_details::{assert_problem_details, ProblemDetailsLike};
