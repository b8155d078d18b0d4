//! Console session: token input, formatted output and the mode policy.
//!
//! A [`Console`] is what every exported runtime symbol operates on. It pairs
//! a [`TokenReader`] with an output sink and applies the configured
//! [`RuntimeMode`]:
//!
//! ```text
//! read failure --strict--> Err(RuntimeError)            (caller prints + exits)
//!              --hardened-> healed value, counted + logged
//! ```
//!
//! Writes are flushed before returning.

use std::io::{BufRead, Write};

use ecert_membrane::log::{self, EventLevel, RuntimeEvent};
use ecert_membrane::{HealingAction, HealingPolicy, RuntimeConfig, global_healing_policy};

use crate::error::RuntimeError;
use crate::input::{self, Staged, TokenReader};
use crate::output;
use crate::validate;

pub type Result<T> = std::result::Result<T, RuntimeError>;

pub struct Console<R, W> {
    reader: TokenReader<R>,
    out: W,
    config: RuntimeConfig,
    policy: &'static HealingPolicy,
    heals: u64,
    scratch: Vec<u8>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Console recording heals into the process-wide policy.
    pub fn new(input: R, out: W, config: RuntimeConfig) -> Self {
        Self {
            reader: TokenReader::new(input),
            out,
            config,
            policy: global_healing_policy(),
            heals: 0,
            scratch: Vec::with_capacity(32),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: &'static HealingPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Heals applied by this console (the policy counts all consoles).
    #[must_use]
    pub fn heals(&self) -> u64 {
        self.heals
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader.into_inner(), self.out)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn get_integer(&mut self) -> Result<i32> {
        match self.reader.read_integer() {
            Err(RuntimeError::IntegerOutOfRange { token, saturated }) => {
                let err = RuntimeError::IntegerOutOfRange { token, saturated };
                let action = HealingAction::SaturateValue {
                    negative: saturated < 0,
                };
                self.heal("getInteger", err, action, saturated)
            }
            other => self.heal_input("getInteger", other, 0),
        }
    }

    /// Booleans are read as integers and returned unchecked.
    pub fn get_bool(&mut self) -> Result<i32> {
        match self.reader.read_bool() {
            Err(RuntimeError::IntegerOutOfRange { token, saturated }) => {
                let err = RuntimeError::IntegerOutOfRange { token, saturated };
                let action = HealingAction::SaturateValue {
                    negative: saturated < 0,
                };
                self.heal("getBool", err, action, saturated)
            }
            other => self.heal_input("getBool", other, 0),
        }
    }

    pub fn get_float(&mut self) -> Result<f32> {
        let read = self.reader.read_float();
        self.heal_input("getFloat", read, 0.0)
    }

    /// Owned string token, sized to the token. Used by the staged variant.
    pub fn get_string(&mut self) -> Result<Vec<u8>> {
        let read = self.reader.read_string();
        self.heal_input("getStagedString", read, Vec::new())
    }

    /// Stage the next token plus terminator into `buf`; returns token
    /// length + 1.
    ///
    /// A token that does not fit is fatal in strict mode and truncated in
    /// hardened mode. Nothing is ever written past `buf.len()`.
    pub fn get_string_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let token = match self.reader.read_string() {
            Ok(token) => token,
            Err(err) if err.is_input_error() && self.config.mode.heals_enabled() => {
                let staged = input::stage_token(b"", buf);
                return self.heal("getString", err, HealingAction::ReturnSafeDefault, staged.length);
            }
            Err(err) => return Err(err),
        };

        let capacity = buf.len();
        let action = self.policy.heal_string_bounds(token.len(), capacity);
        if !action.is_heal() {
            return Ok(input::stage_token(&token, buf).length);
        }

        let err = RuntimeError::StringTooLong {
            len: token.len(),
            capacity,
        };
        if !self.config.mode.heals_enabled() {
            return Err(err);
        }
        let Staged { length, .. } = input::stage_token(&token, buf);
        self.heal("getString", err, action, length)
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    pub fn put_integer(&mut self, value: i32) -> Result<()> {
        self.scratch.clear();
        output::format_integer(value, &mut self.scratch);
        self.flush_scratch()
    }

    pub fn put_bool(&mut self, value: i32) -> Result<()> {
        self.scratch.clear();
        output::format_bool(value, &mut self.scratch);
        self.flush_scratch()
    }

    pub fn put_float(&mut self, value: f32) -> Result<()> {
        self.scratch.clear();
        output::format_float(value, &mut self.scratch);
        self.flush_scratch()
    }

    /// Write `s` up to its first NUL (or entirely, if it has none).
    pub fn put_string(&mut self, s: &[u8]) -> Result<()> {
        output::emit(&mut self.out, output::until_nul(s))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn flush_scratch(&mut self) -> Result<()> {
        output::emit(&mut self.out, &self.scratch)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation and fatal reporting
    // -----------------------------------------------------------------------

    /// Boolean operand check using the configured diagnostic style.
    pub fn validate_boolean_op(&self, left: i32, op: u8, right: i32, line: i32) -> Result<()> {
        validate::validate_boolean_op_with(self.config.diagnostic, left, op, right, line)
    }

    /// Print the diagnostic for `err` on this console's output, exactly
    /// `FATAL ERROR:<message>` with no trailing newline, and log it.
    pub fn report_fatal(&mut self, symbol: &str, err: &RuntimeError) -> std::io::Result<()> {
        log::emit(
            RuntimeEvent::new(EventLevel::Fatal, err.kind())
                .with_mode(self.config.mode)
                .with_symbol(symbol)
                .with_message(err.to_string()),
        );
        output::emit(&mut self.out, &err.diagnostic_bytes())
    }

    // -----------------------------------------------------------------------
    // Healing
    // -----------------------------------------------------------------------

    fn heal_input<T>(&mut self, symbol: &str, read: Result<T>, fallback: T) -> Result<T> {
        match read {
            Ok(value) => Ok(value),
            Err(err) if err.is_input_error() => {
                self.heal(symbol, err, HealingAction::ReturnSafeDefault, fallback)
            }
            Err(err) => Err(err),
        }
    }

    fn heal<T>(
        &mut self,
        symbol: &str,
        err: RuntimeError,
        action: HealingAction,
        value: T,
    ) -> Result<T> {
        let mode = self.config.mode;
        if !mode.heals_enabled() {
            return Err(err);
        }
        if mode.records_heals() {
            self.heals += 1;
            self.policy.record(&action);
            let mut event = RuntimeEvent::new(EventLevel::Warn, err.kind())
                .with_mode(mode)
                .with_symbol(symbol)
                .with_healing(&action)
                .with_message(err.to_string());
            if let Some(details) = heal_details(&action) {
                event = event.with_details(details);
            }
            log::emit(event);
        }
        Ok(value)
    }
}

fn heal_details(action: &HealingAction) -> Option<serde_json::Value> {
    match *action {
        HealingAction::SaturateValue { negative } => {
            Some(serde_json::json!({ "negative": negative }))
        }
        HealingAction::TruncateWithNull {
            requested,
            truncated,
        } => Some(serde_json::json!({ "requested": requested, "truncated": truncated })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecert_membrane::{DiagnosticStyle, RuntimeMode};

    fn console(input: &str, mode: RuntimeMode) -> Console<&[u8], Vec<u8>> {
        static POLICY: HealingPolicy = HealingPolicy::new();
        Console::new(
            input.as_bytes(),
            Vec::new(),
            RuntimeConfig::default().with_mode(mode),
        )
        .with_policy(&POLICY)
    }

    fn stdout(c: &Console<&[u8], Vec<u8>>) -> String {
        String::from_utf8(c.output().clone()).unwrap()
    }

    #[test]
    fn reads_each_primitive() {
        let mut c = console("42 1 2.5 hello", RuntimeMode::Strict);
        assert_eq!(c.get_integer().unwrap(), 42);
        assert_eq!(c.get_bool().unwrap(), 1);
        assert_eq!(c.get_float().unwrap(), 2.5);
        assert_eq!(c.get_string().unwrap(), b"hello");
    }

    #[test]
    fn get_string_into_returns_length_with_terminator() {
        let mut c = console("hello", RuntimeMode::Strict);
        let mut buf = [0u8; input::DEFAULT_STRING_CAPACITY];
        assert_eq!(c.get_string_into(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b"hello\0");
    }

    #[test]
    fn writes_use_fixed_conventions() {
        let mut c = console("", RuntimeMode::Strict);
        c.put_integer(-12).unwrap();
        c.put_bool(1).unwrap();
        c.put_bool(0).unwrap();
        c.put_float(1.5).unwrap();
        c.put_string(b"done\0ignored").unwrap();
        assert_eq!(stdout(&c), "-12truefalse1.500000done");
    }

    #[test]
    fn strict_mode_makes_bad_input_fatal() {
        let mut c = console("abc", RuntimeMode::Strict);
        let err = c.get_integer().unwrap_err();
        assert!(matches!(err, RuntimeError::MalformedInteger { .. }));
        assert_eq!(c.heals(), 0);

        let mut c = console("", RuntimeMode::Strict);
        assert!(matches!(c.get_float(), Err(RuntimeError::EndOfInput)));
    }

    #[test]
    fn hardened_mode_heals_bad_input() {
        let mut c = console("abc 99999999999 x.y", RuntimeMode::Hardened);
        assert_eq!(c.get_integer().unwrap(), 0);
        assert_eq!(c.get_integer().unwrap(), i32::MAX);
        assert_eq!(c.get_float().unwrap(), 0.0);
        assert_eq!(c.get_bool().unwrap(), 0); // end of input
        assert_eq!(c.heals(), 4);
    }

    #[test]
    fn strict_mode_rejects_oversized_string() {
        let mut c = console("overflowing", RuntimeMode::Strict);
        let mut buf = [0xaau8; 4];
        match c.get_string_into(&mut buf) {
            Err(RuntimeError::StringTooLong { len, capacity }) => {
                assert_eq!((len, capacity), (11, 4));
            }
            other => panic!("unexpected {other:?}"),
        }
        // Strict rejection leaves the caller buffer untouched.
        assert_eq!(buf, [0xaa; 4]);
    }

    #[test]
    fn hardened_mode_truncates_oversized_string() {
        let mut c = console("overflowing next", RuntimeMode::Hardened);
        let mut buf = [0xaau8; 4];
        assert_eq!(c.get_string_into(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"ove\0");
        assert_eq!(c.heals(), 1);
        assert_eq!(c.get_string().unwrap(), b"next");
    }

    #[test]
    fn hardened_end_of_input_stages_empty_string() {
        let mut c = console("   ", RuntimeMode::Hardened);
        let mut buf = [0xaau8; 8];
        assert_eq!(c.get_string_into(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn off_mode_heals_without_counting() {
        let mut c = console("zzz", RuntimeMode::Off);
        assert_eq!(c.get_integer().unwrap(), 0);
        assert_eq!(c.heals(), 0);
    }

    #[test]
    fn boolean_operands_are_never_healed() {
        let c = console("", RuntimeMode::Hardened);
        assert!(c.validate_boolean_op(1, b'&', 0, 3).is_ok());
        assert!(c.validate_boolean_op(2, b'&', 0, 3).is_err());
    }

    #[test]
    fn diagnostic_style_comes_from_config() {
        let c = Console::new(
            &b""[..],
            Vec::new(),
            RuntimeConfig::new(RuntimeMode::Strict, DiagnosticStyle::Legacy),
        );
        let err = c.validate_boolean_op(0, b'|', 5, 8).unwrap_err();
        assert!(err.diagnostic().ends_with("illegal value of 0"));
    }

    #[test]
    fn report_fatal_prints_exact_diagnostic() {
        let mut c = console("", RuntimeMode::Strict);
        c.put_integer(1).unwrap();
        let err = c.validate_boolean_op(4, b'&', 1, 19).unwrap_err();
        c.report_fatal("validateBooleanOp", &err).unwrap();
        assert_eq!(
            stdout(&c),
            "1FATAL ERROR:line 19:Left operand to boolean operator '&' had illegal value of 4"
        );
    }

    #[test]
    fn report_fatal_writes_operator_as_one_byte() {
        let mut c = console("", RuntimeMode::Strict);
        let err = c.validate_boolean_op(2, 0xe9, 1, 1).unwrap_err();
        c.report_fatal("validateBooleanOp", &err).unwrap();
        let out = c.output();
        assert_eq!(out.len(), 78);
        assert_eq!(out.iter().filter(|&&b| b == 0xe9).count(), 1);
    }
}
