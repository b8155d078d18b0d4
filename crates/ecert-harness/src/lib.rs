//! Conformance testing harness for the ecert runtime.
//!
//! This crate provides:
//! - Fixtures: JSON scripts of runtime calls with the stdin they consume and
//!   the stdout, return values and exit status they must produce
//! - Runner: executes fixtures in-process against a [`ecert_core::Console`]
//!   over in-memory streams, in strict and hardened mode
//! - Report generation: human-readable + machine-readable conformance reports
//! - Structured JSONL logging of verification runs

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet, RuntimeCall};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
