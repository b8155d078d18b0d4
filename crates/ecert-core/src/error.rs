//! Runtime error taxonomy.

use std::fmt;

use thiserror::Error;

/// Prefix of every diagnostic the runtime prints before terminating.
pub const FATAL_PREFIX: &str = "FATAL ERROR:";

/// Which operand of a binary boolean operator failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "Left",
            Self::Right => "Right",
        })
    }
}

/// Operator byte as the caller passed it.
///
/// `Display` maps the byte to one `char` (Latin-1 above 0x7f). The raw byte
/// is what [`RuntimeError::diagnostic_bytes`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(pub u8);

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&char::from(self.0), f)
    }
}

/// Everything that can go wrong inside the runtime.
///
/// `InvalidBooleanOperand` and `Io` are always fatal. The input variants are
/// fatal in strict mode and healed in hardened mode.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A boolean operator received an operand outside {0, 1}. `value` is the
    /// value the diagnostic reports.
    #[error("line {line}:{side} operand to boolean operator '{op}' had illegal value of {value}")]
    InvalidBooleanOperand {
        line: i32,
        op: Operator,
        side: Side,
        value: i32,
    },

    #[error("expected integer input but found '{token}'")]
    MalformedInteger { token: String },

    /// The token is a well-formed integer that does not fit in 32 bits.
    /// `saturated` is the nearest representable value.
    #[error("integer input '{token}' is out of range")]
    IntegerOutOfRange { token: String, saturated: i32 },

    #[error("expected float input but found '{token}'")]
    MalformedFloat { token: String },

    #[error("unexpected end of input")]
    EndOfInput,

    /// The token plus its terminator does not fit the destination buffer.
    #[error("string input of {len} bytes exceeds buffer capacity of {capacity}")]
    StringTooLong { len: usize, capacity: usize },

    #[error("console i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Full diagnostic line as printed on standard output (no newline).
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!("{FATAL_PREFIX}{self}")
    }

    /// Diagnostic bytes as written to standard output. The operator is
    /// emitted as its single raw byte, like `printf("%c")`.
    #[must_use]
    pub fn diagnostic_bytes(&self) -> Vec<u8> {
        match self {
            Self::InvalidBooleanOperand {
                line,
                op,
                side,
                value,
            } => {
                let mut out =
                    format!("{FATAL_PREFIX}line {line}:{side} operand to boolean operator '")
                        .into_bytes();
                out.push(op.0);
                out.extend_from_slice(format!("' had illegal value of {value}").as_bytes());
                out
            }
            _ => self.diagnostic().into_bytes(),
        }
    }

    /// Returns true for input failures that hardened mode may heal.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInteger { .. }
                | Self::IntegerOutOfRange { .. }
                | Self::MalformedFloat { .. }
                | Self::EndOfInput
                | Self::StringTooLong { .. }
        )
    }

    /// Stable snake_case name, used as the event name in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBooleanOperand { .. } => "invalid_boolean_operand",
            Self::MalformedInteger { .. } => "malformed_integer",
            Self::IntegerOutOfRange { .. } => "integer_out_of_range",
            Self::MalformedFloat { .. } => "malformed_float",
            Self::EndOfInput => "end_of_input",
            Self::StringTooLong { .. } => "string_too_long",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_operand_diagnostic_matches_legacy_text() {
        let err = RuntimeError::InvalidBooleanOperand {
            line: 12,
            op: Operator(b'&'),
            side: Side::Left,
            value: 5,
        };
        assert_eq!(
            err.diagnostic(),
            "FATAL ERROR:line 12:Left operand to boolean operator '&' had illegal value of 5"
        );
    }

    #[test]
    fn right_side_and_negative_values() {
        let err = RuntimeError::InvalidBooleanOperand {
            line: 3,
            op: Operator(b'|'),
            side: Side::Right,
            value: -1,
        };
        assert_eq!(
            err.to_string(),
            "line 3:Right operand to boolean operator '|' had illegal value of -1"
        );
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(RuntimeError::EndOfInput.is_input_error());
        assert!(
            RuntimeError::MalformedInteger {
                token: "x".into()
            }
            .is_input_error()
        );
        assert!(
            !RuntimeError::InvalidBooleanOperand {
                line: 1,
                op: Operator(b'&'),
                side: Side::Left,
                value: 2
            }
            .is_input_error()
        );
        assert!(!RuntimeError::Io(std::io::Error::other("boom")).is_input_error());
    }

    #[test]
    fn input_diagnostics() {
        assert_eq!(
            RuntimeError::MalformedInteger {
                token: "abc".into()
            }
            .diagnostic(),
            "FATAL ERROR:expected integer input but found 'abc'"
        );
        assert_eq!(
            RuntimeError::StringTooLong {
                len: 2000,
                capacity: 1024
            }
            .to_string(),
            "string input of 2000 bytes exceeds buffer capacity of 1024"
        );
        assert_eq!(RuntimeError::EndOfInput.kind(), "end_of_input");
    }

    #[test]
    fn high_operator_byte_is_written_raw() {
        let err = RuntimeError::InvalidBooleanOperand {
            line: 1,
            op: Operator(0xe9),
            side: Side::Left,
            value: 2,
        };
        let bytes = err.diagnostic_bytes();
        assert_eq!(
            bytes,
            b"FATAL ERROR:line 1:Left operand to boolean operator '\xe9' had illegal value of 2"
        );
        assert_eq!(bytes.len(), 78);
    }

    #[test]
    fn ascii_diagnostic_bytes_match_text() {
        let err = RuntimeError::InvalidBooleanOperand {
            line: 9,
            op: Operator(b'|'),
            side: Side::Right,
            value: 3,
        };
        assert_eq!(err.diagnostic_bytes(), err.diagnostic().into_bytes());
        assert_eq!(
            RuntimeError::EndOfInput.diagnostic_bytes(),
            b"FATAL ERROR:unexpected end of input"
        );
    }
}
