//! Runtime configuration.
//!
//! The runtime mode is set via the `ECERT_MODE` environment variable:
//! - `strict` (default): malformed console input, exhausted input and
//!   oversized string tokens are fatal, exactly like an illegal boolean operand.
//! - `hardened`: bad input is healed deterministically (safe default value,
//!   saturation, truncation) and recorded in the healing policy.
//!
//! The wording of the right-operand boolean diagnostic is set via
//! `ECERT_BOOL_DIAGNOSTIC`:
//! - `corrected` (default): the message reports the right operand's value.
//! - `legacy`: the message reports the left operand's value, byte-for-byte
//!   what older runtimes printed.
//!
//! Both settings are read on first use and cached for the life of the process.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable selecting the [`RuntimeMode`].
pub const MODE_ENV: &str = "ECERT_MODE";
/// Environment variable selecting the [`DiagnosticStyle`].
pub const DIAGNOSTIC_ENV: &str = "ECERT_BOOL_DIAGNOSTIC";

/// How the runtime reacts to input it cannot honor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeMode {
    /// Every input failure terminates the program with a diagnostic.
    #[default]
    Strict,
    /// Input failures are healed and the program keeps running.
    Hardened,
    /// No checks on input at all; failures collapse to zero values without
    /// being recorded. Benchmark baseline only, never selected from the
    /// environment.
    Off,
}

impl RuntimeMode {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "default" | "abi" => Self::Strict,
            "hardened" | "repair" | "lenient" => Self::Hardened,
            "off" | "none" | "disabled" => Self::Off,
            _ => Self::Strict,
        }
    }

    /// Returns true if input failures are healed instead of being fatal.
    #[must_use]
    pub const fn heals_enabled(self) -> bool {
        matches!(self, Self::Hardened | Self::Off)
    }

    /// Returns true if heals are counted and logged.
    #[must_use]
    pub const fn records_heals(self) -> bool {
        matches!(self, Self::Hardened)
    }

    /// Stable lowercase name, used in logs and fixtures.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
            Self::Off => "off",
        }
    }
}

/// Which value the right-operand boolean diagnostic reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticStyle {
    /// Report the offending (right) operand.
    #[default]
    Corrected,
    /// Report the left operand, as the first runtimes did.
    Legacy,
}

impl DiagnosticStyle {
    /// Parse from string (case-insensitive). Unknown values are `Corrected`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "compat" | "original" => Self::Legacy,
            _ => Self::Corrected,
        }
    }
}

/// Complete runtime configuration handed to a console.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub mode: RuntimeMode,
    pub diagnostic: DiagnosticStyle,
}

impl RuntimeConfig {
    #[must_use]
    pub const fn new(mode: RuntimeMode, diagnostic: DiagnosticStyle) -> Self {
        Self { mode, diagnostic }
    }

    /// Configuration resolved from the process environment (cached).
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            mode: runtime_mode(),
            diagnostic: diagnostic_style(),
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_diagnostic(mut self, diagnostic: DiagnosticStyle) -> Self {
        self.diagnostic = diagnostic;
        self
    }
}

// Atomic caches: 0=unresolved, 255=resolving, anything else is a resolved code.
// A reentrant or racing call that sees RESOLVING gets the default instead of
// blocking.
static CACHED_MODE: AtomicU8 = AtomicU8::new(UNRESOLVED);
static CACHED_DIAGNOSTIC: AtomicU8 = AtomicU8::new(UNRESOLVED);

const UNRESOLVED: u8 = 0;
const RESOLVING: u8 = 255;

const MODE_STRICT: u8 = 1;
const MODE_HARDENED: u8 = 2;
const MODE_OFF: u8 = 3;

const DIAG_CORRECTED: u8 = 1;
const DIAG_LEGACY: u8 = 2;

fn parse_runtime_mode_env(raw: &str) -> RuntimeMode {
    // Environment contract is strict|hardened only. `Off` stays reachable
    // through `RuntimeConfig` for benches.
    match RuntimeMode::from_str_loose(raw) {
        RuntimeMode::Off => RuntimeMode::Strict,
        mode => mode,
    }
}

fn mode_to_u8(mode: RuntimeMode) -> u8 {
    match mode {
        RuntimeMode::Strict => MODE_STRICT,
        RuntimeMode::Hardened => MODE_HARDENED,
        RuntimeMode::Off => MODE_OFF,
    }
}

fn u8_to_mode(v: u8) -> RuntimeMode {
    match v {
        MODE_HARDENED => RuntimeMode::Hardened,
        MODE_OFF => RuntimeMode::Off,
        _ => RuntimeMode::Strict,
    }
}

fn diagnostic_to_u8(style: DiagnosticStyle) -> u8 {
    match style {
        DiagnosticStyle::Corrected => DIAG_CORRECTED,
        DiagnosticStyle::Legacy => DIAG_LEGACY,
    }
}

fn u8_to_diagnostic(v: u8) -> DiagnosticStyle {
    match v {
        DIAG_LEGACY => DiagnosticStyle::Legacy,
        _ => DiagnosticStyle::Corrected,
    }
}

/// Resolve a cached setting, reading `var` only the first time.
///
/// Returns `None` while another caller is resolving; the caller substitutes
/// its default.
fn resolve_cached(cell: &AtomicU8, var: &str, parse: impl FnOnce(&str) -> u8) -> Option<u8> {
    let cached = cell.load(Ordering::Acquire);
    if cached != UNRESOLVED && cached != RESOLVING {
        return Some(cached);
    }
    if cached == RESOLVING {
        return None;
    }

    if cell
        .compare_exchange(UNRESOLVED, RESOLVING, Ordering::SeqCst, Ordering::Relaxed)
        .is_err()
    {
        let v = cell.load(Ordering::Acquire);
        return (v != UNRESOLVED && v != RESOLVING).then_some(v);
    }

    let code = std::env::var(var).map_or(DEFAULT_CODE, |v| parse(&v));
    cell.store(code, Ordering::Release);
    Some(code)
}

// Code 1 is the default for both settings (Strict / Corrected).
const DEFAULT_CODE: u8 = 1;

/// Get the configured runtime mode (reads `ECERT_MODE` on first call).
#[must_use]
pub fn runtime_mode() -> RuntimeMode {
    resolve_cached(&CACHED_MODE, MODE_ENV, |raw| {
        mode_to_u8(parse_runtime_mode_env(raw))
    })
    .map_or(RuntimeMode::Strict, u8_to_mode)
}

/// Get the configured diagnostic style (reads `ECERT_BOOL_DIAGNOSTIC` on first call).
#[must_use]
pub fn diagnostic_style() -> DiagnosticStyle {
    resolve_cached(&CACHED_DIAGNOSTIC, DIAGNOSTIC_ENV, |raw| {
        diagnostic_to_u8(DiagnosticStyle::from_str_loose(raw))
    })
    .map_or(DiagnosticStyle::Corrected, u8_to_diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_runtime_modes() {
        assert_eq!(RuntimeMode::from_str_loose("strict"), RuntimeMode::Strict);
        assert_eq!(RuntimeMode::from_str_loose("STRICT"), RuntimeMode::Strict);
        assert_eq!(RuntimeMode::from_str_loose(" abi "), RuntimeMode::Strict);
        assert_eq!(
            RuntimeMode::from_str_loose("hardened"),
            RuntimeMode::Hardened
        );
        assert_eq!(RuntimeMode::from_str_loose("repair"), RuntimeMode::Hardened);
        assert_eq!(RuntimeMode::from_str_loose("lenient"), RuntimeMode::Hardened);
        assert_eq!(RuntimeMode::from_str_loose("off"), RuntimeMode::Off);
        assert_eq!(RuntimeMode::from_str_loose("bogus"), RuntimeMode::Strict);
    }

    #[test]
    fn env_parser_never_selects_off() {
        assert_eq!(parse_runtime_mode_env("hardened"), RuntimeMode::Hardened);
        assert_eq!(parse_runtime_mode_env("off"), RuntimeMode::Strict);
        assert_eq!(parse_runtime_mode_env("none"), RuntimeMode::Strict);
    }

    #[test]
    fn parse_diagnostic_styles() {
        assert_eq!(
            DiagnosticStyle::from_str_loose("legacy"),
            DiagnosticStyle::Legacy
        );
        assert_eq!(
            DiagnosticStyle::from_str_loose("Original"),
            DiagnosticStyle::Legacy
        );
        assert_eq!(
            DiagnosticStyle::from_str_loose("corrected"),
            DiagnosticStyle::Corrected
        );
        assert_eq!(DiagnosticStyle::from_str_loose(""), DiagnosticStyle::Corrected);
    }

    #[test]
    fn heals_only_outside_strict() {
        assert!(!RuntimeMode::Strict.heals_enabled());
        assert!(RuntimeMode::Hardened.heals_enabled());
        assert!(RuntimeMode::Off.heals_enabled());
        assert!(RuntimeMode::Hardened.records_heals());
        assert!(!RuntimeMode::Off.records_heals());
    }

    #[test]
    fn config_builders() {
        let cfg = RuntimeConfig::default()
            .with_mode(RuntimeMode::Hardened)
            .with_diagnostic(DiagnosticStyle::Legacy);
        assert_eq!(
            cfg,
            RuntimeConfig::new(RuntimeMode::Hardened, DiagnosticStyle::Legacy)
        );
    }

    #[test]
    fn cached_mode_is_process_sticky_until_cache_reset() {
        let previous = CACHED_MODE.swap(MODE_STRICT, Ordering::SeqCst);
        assert_eq!(runtime_mode(), RuntimeMode::Strict);

        CACHED_MODE.store(MODE_HARDENED, Ordering::SeqCst);
        assert_eq!(runtime_mode(), RuntimeMode::Hardened);
        assert_eq!(runtime_mode(), RuntimeMode::Hardened);

        CACHED_MODE.store(RESOLVING, Ordering::SeqCst);
        assert_eq!(runtime_mode(), RuntimeMode::Strict);

        CACHED_MODE.store(previous, Ordering::SeqCst);
    }

    #[test]
    fn cached_diagnostic_is_sticky() {
        let previous = CACHED_DIAGNOSTIC.swap(DIAG_LEGACY, Ordering::SeqCst);
        assert_eq!(diagnostic_style(), DiagnosticStyle::Legacy);
        CACHED_DIAGNOSTIC.store(previous, Ordering::SeqCst);
    }
}
