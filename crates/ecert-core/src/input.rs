//! Token input.
//!
//! Every reader skips leading whitespace (the C `isspace` set) and then takes
//! one token: the maximal run of non-whitespace bytes. The delimiter that ends
//! the token stays in the stream, as with `scanf`.

use std::io::{self, BufRead};

use crate::error::RuntimeError;

/// Capacity assumed for caller buffers whose size the caller does not pass.
pub const DEFAULT_STRING_CAPACITY: usize = 1024;

/// C `isspace` in the "C" locale: space, `\t`, `\n`, `\v`, `\f`, `\r`.
#[inline]
#[must_use]
pub const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Whitespace-delimited token reader over any buffered input.
///
/// End of input is sticky: once the stream reports EOF it is not read again,
/// so a terminal user sends Ctrl-D once.
#[derive(Debug)]
pub struct TokenReader<R> {
    inner: R,
    tokens: u64,
    eof: bool,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            tokens: 0,
            eof: false,
        }
    }

    /// True once the underlying stream has reported end of input.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.eof
    }

    /// Number of tokens taken so far.
    #[must_use]
    pub fn tokens_read(&self) -> u64 {
        self.tokens
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next token, or `None` once the stream is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Vec<u8>>, RuntimeError> {
        if self.eof {
            return Ok(None);
        }

        // Skip leading whitespace.
        loop {
            let buf = fill(&mut self.inner)?;
            if buf.is_empty() {
                self.eof = true;
                return Ok(None);
            }
            let skip = buf.iter().take_while(|&&b| is_space(b)).count();
            let found = skip < buf.len();
            self.inner.consume(skip);
            if found {
                break;
            }
        }

        let mut token = Vec::new();
        loop {
            let buf = fill(&mut self.inner)?;
            if buf.is_empty() {
                self.eof = true;
                break;
            }
            let take = buf.iter().take_while(|&&b| !is_space(b)).count();
            token.extend_from_slice(&buf[..take]);
            let ended = take < buf.len();
            self.inner.consume(take);
            if ended {
                break;
            }
        }
        self.tokens += 1;
        Ok(Some(token))
    }

    fn require_token(&mut self) -> Result<Vec<u8>, RuntimeError> {
        self.next_token()?.ok_or(RuntimeError::EndOfInput)
    }

    /// Read a signed 32-bit decimal integer.
    pub fn read_integer(&mut self) -> Result<i32, RuntimeError> {
        let token = self.require_token()?;
        parse_integer(&token)
    }

    /// Read a boolean. Same as [`read_integer`](Self::read_integer): the value
    /// is not range-checked here.
    pub fn read_bool(&mut self) -> Result<i32, RuntimeError> {
        self.read_integer()
    }

    /// Read a 32-bit float.
    pub fn read_float(&mut self) -> Result<f32, RuntimeError> {
        let token = self.require_token()?;
        parse_float(&token)
    }

    /// Read a string token into an owned buffer sized to the token.
    pub fn read_string(&mut self) -> Result<Vec<u8>, RuntimeError> {
        self.require_token()
    }
}

/// `fill_buf`, retried on `Interrupted`. At EOF the stream is read exactly
/// once.
fn fill<R: BufRead>(inner: &mut R) -> io::Result<&[u8]> {
    loop {
        match inner.fill_buf() {
            Ok(buf) if buf.is_empty() => return Ok(&[]),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    inner.fill_buf()
}

/// Parse a whole token as `[+-]?[0-9]+` into an `i32`.
pub fn parse_integer(token: &[u8]) -> Result<i32, RuntimeError> {
    let malformed = || RuntimeError::MalformedInteger {
        token: String::from_utf8_lossy(token).into_owned(),
    };

    let (negative, digits) = match token.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed());
    }

    let abs_max: u32 = if negative {
        i32::MIN.unsigned_abs()
    } else {
        i32::MAX as u32
    };
    let cutoff = abs_max / 10;
    let cutlim = abs_max % 10;

    let mut acc: u32 = 0;
    for &c in digits {
        let digit = u32::from(c - b'0');
        if acc > cutoff || (acc == cutoff && digit > cutlim) {
            return Err(RuntimeError::IntegerOutOfRange {
                token: String::from_utf8_lossy(token).into_owned(),
                saturated: if negative { i32::MIN } else { i32::MAX },
            });
        }
        acc = acc * 10 + digit;
    }

    Ok(if negative {
        (acc as i32).wrapping_neg()
    } else {
        acc as i32
    })
}

/// Parse a whole token as a decimal or scientific float, or
/// `inf`/`infinity`/`nan` in any case.
pub fn parse_float(token: &[u8]) -> Result<f32, RuntimeError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .ok_or_else(|| RuntimeError::MalformedFloat {
            token: String::from_utf8_lossy(token).into_owned(),
        })
}

/// Outcome of copying a token into a fixed caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staged {
    /// Bytes written including the NUL terminator. This is the value
    /// `getString` returns: token length + 1 when the token fits.
    pub length: usize,
    /// Length of the token as read.
    pub token_len: usize,
}

impl Staged {
    /// True if part of the token was dropped to fit the buffer.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.length <= self.token_len
    }
}

/// Copy `token` and a NUL terminator into `buf`, truncating to fit.
///
/// The reported length counts every token byte, including any embedded NUL.
///
/// Never writes past `buf.len()`. A zero-length buffer receives nothing.
pub fn stage_token(token: &[u8], buf: &mut [u8]) -> Staged {
    let token_len = token.len();
    let Some(room) = buf.len().checked_sub(1) else {
        return Staged {
            length: 0,
            token_len,
        };
    };
    let copy = token_len.min(room);
    buf[..copy].copy_from_slice(&token[..copy]);
    buf[copy] = 0;
    Staged {
        length: copy + 1,
        token_len,
    }
}
