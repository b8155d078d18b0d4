//! Boolean operand validation.
//!
//! Generated code calls the check before evaluating `&` or `|` on values it
//! treats as booleans. An operand outside {0, 1} means the generated code is
//! wrong, so the error is never healed.

use ecert_membrane::DiagnosticStyle;

use crate::error::{Operator, RuntimeError, Side};

#[inline]
#[must_use]
pub const fn is_boolean(value: i32) -> bool {
    value == 0 || value == 1
}

/// Check both operands, left first. The diagnostic reports the offending
/// operand's own value.
pub fn validate_boolean_op(left: i32, op: u8, right: i32, line: i32) -> Result<(), RuntimeError> {
    validate_boolean_op_with(DiagnosticStyle::Corrected, left, op, right, line)
}

/// Like [`validate_boolean_op`], with the right-operand wording selectable.
///
/// [`DiagnosticStyle::Legacy`] reports the left operand's value when the
/// right operand is the illegal one, matching the text older runtimes
/// produced.
pub fn validate_boolean_op_with(
    style: DiagnosticStyle,
    left: i32,
    op: u8,
    right: i32,
    line: i32,
) -> Result<(), RuntimeError> {
    let op = Operator(op);
    if !is_boolean(left) {
        return Err(RuntimeError::InvalidBooleanOperand {
            line,
            op,
            side: Side::Left,
            value: left,
        });
    }
    if !is_boolean(right) {
        let value = match style {
            DiagnosticStyle::Corrected => right,
            DiagnosticStyle::Legacy => left,
        };
        return Err(RuntimeError::InvalidBooleanOperand {
            line,
            op,
            side: Side::Right,
            value,
        });
    }
    Ok(())
}
