//! # ecert-membrane
//!
//! Policy layer shared by the safe core and the C boundary of the ecert
//! runtime:
//!
//! - [`config`]: runtime mode (`strict` / `hardened`) and diagnostic style,
//!   resolved once from the environment.
//! - [`heal`]: deterministic healing actions applied to bad console input in
//!   hardened mode, with process-wide counters.
//! - [`log`]: optional JSONL event log for heals and fatal errors.

#![deny(unsafe_code)]

pub mod config;
pub mod heal;
pub mod log;

pub use config::{DiagnosticStyle, RuntimeConfig, RuntimeMode};
pub use heal::{HealingAction, HealingPolicy, global_healing_policy};
