//! # ecert-core
//!
//! Safe Rust implementation of the console runtime that compiled programs
//! link against: whitespace-delimited token input, fixed-convention output,
//! and the boolean operand check emitted around every `&`/`|`.
//!
//! Nothing here terminates the process. Failures come back as
//! [`RuntimeError`]; the C boundary in `ecert-abi` decides to print the
//! diagnostic and exit.

#![deny(unsafe_code)]

pub mod console;
pub mod error;
pub mod input;
pub mod output;
pub mod validate;

pub use console::Console;
pub use error::{Operator, RuntimeError, Side};
pub use input::{DEFAULT_STRING_CAPACITY, Staged, TokenReader, stage_token};
pub use validate::{validate_boolean_op, validate_boolean_op_with};
