//! Output formatting.
//!
//! Fixed textual conventions, one per primitive:
//! - integers: plain decimal, no separator (`%d`)
//! - booleans: `true` for any nonzero value, `false` for zero
//! - floats: six fractional digits (`%f`), `inf`/`nan` spelled as glibc does
//! - strings: bytes up to the terminator, verbatim (`%s`)

use std::io::{self, Write};

/// Fractional digits printed for every float.
pub const FLOAT_PRECISION: usize = 6;

/// Canonical text for a nonzero boolean.
pub const TRUE_TEXT: &[u8] = b"true";
/// Canonical text for a zero boolean.
pub const FALSE_TEXT: &[u8] = b"false";

pub fn format_integer(value: i32, buf: &mut Vec<u8>) {
    // i32::MIN has no positive counterpart; widen before taking the magnitude.
    let mut magnitude = i64::from(value).unsigned_abs();
    let mut digits = [0u8; 10];
    let mut n = 0;
    loop {
        digits[n] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        n += 1;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        buf.push(b'-');
    }
    buf.extend(digits[..n].iter().rev());
}

pub fn format_bool(value: i32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(if value != 0 { TRUE_TEXT } else { FALSE_TEXT });
}

/// Format as `%f` of the value promoted to double.
pub fn format_float(value: f32, buf: &mut Vec<u8>) {
    if value.is_nan() {
        buf.extend_from_slice(if value.is_sign_negative() {
            &b"-nan"[..]
        } else {
            &b"nan"[..]
        });
    } else if value.is_infinite() {
        buf.extend_from_slice(if value < 0.0 { &b"-inf"[..] } else { &b"inf"[..] });
    } else {
        let widened = f64::from(value);
        buf.extend_from_slice(format!("{widened:.prec$}", prec = FLOAT_PRECISION).as_bytes());
    }
}

/// Bytes of `s` up to (not including) the first NUL.
#[must_use]
pub fn until_nul(s: &[u8]) -> &[u8] {
    s.iter().position(|&b| b == 0).map_or(s, |end| &s[..end])
}

/// Write `bytes` and flush, so nothing lingers in a buffer if the process
/// is about to exit.
pub fn emit<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
