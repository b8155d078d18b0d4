//! Boolean operand check emitted by the compiler around `&` and `|`.

use std::ffi::{c_char, c_int};

use crate::console_abi::with_console;
use crate::macros::abi_fn;

abi_fn! {
    /// Return if both operands are 0 or 1; otherwise print the diagnostic
    /// and exit with status 1.
    fn validateBooleanOp(left: c_int, op: c_char, right: c_int, lineno: c_int) {
        with_console("validateBooleanOp", |c| {
            c.validate_boolean_op(left, op as u8, right, lineno)
        })
    }
}
