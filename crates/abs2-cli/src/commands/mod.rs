//! CLI command implementations.

pub mod account;
pub mod common;
pub mod job;
pub mod problem;
pub mod solution;
pub mod status;
