//! Runtime event log.
//!
//! When `ECERT_LOG` names a file, every heal and every fatal error is
//! appended to it as one JSON object per line. Nothing is ever written to the
//! program's own stdout/stderr, which belong to the compiled program.
//! Without the variable the log is a no-op.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::RuntimeMode;
use crate::heal::HealingAction;

/// Environment variable naming the JSONL event file.
pub const LOG_ENV: &str = "ECERT_LOG";

/// Severity of a runtime event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Warn,
    Fatal,
}

/// One JSONL record.
///
/// Required fields: `timestamp`, `seq`, `level`, `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEvent {
    pub timestamp: String,
    pub seq: u64,
    pub level: EventLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Exported C symbol the event happened in (`getInteger`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healing_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RuntimeEvent {
    /// Create an event with required fields only. `seq` is assigned on emit.
    #[must_use]
    pub fn new(level: EventLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            seq: 0,
            level,
            event: event.into(),
            mode: None,
            symbol: None,
            healing_action: None,
            message: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode.as_str().to_string());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_healing(mut self, action: &HealingAction) -> Self {
        self.healing_action = Some(action.name().to_string());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sequenced JSONL writer.
pub struct EventLog {
    writer: Box<dyn Write + Send>,
    seq: u64,
}

impl EventLog {
    /// Append to (creating if needed) the file at `path`.
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(Box::new(file)))
    }

    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer, seq: 0 }
    }

    /// Number of events written so far.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Assign the next sequence number and write the event.
    ///
    /// Each line is flushed immediately: the process may exit right after a
    /// fatal event.
    pub fn record(&mut self, mut event: RuntimeEvent) -> io::Result<()> {
        self.seq += 1;
        event.seq = self.seq;
        let line = event.to_jsonl().map_err(io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

fn global_event_log() -> Option<&'static Mutex<EventLog>> {
    static LOG: OnceLock<Option<Mutex<EventLog>>> = OnceLock::new();
    LOG.get_or_init(|| {
        let path = std::env::var_os(LOG_ENV)?;
        EventLog::to_file(Path::new(&path)).ok().map(Mutex::new)
    })
    .as_ref()
}

/// Best-effort emit into the process event log.
///
/// Write failures are swallowed: logging must never change what the compiled
/// program observes.
pub fn emit(event: RuntimeEvent) {
    if let Some(log) = global_event_log() {
        let _ = log.lock().record(event);
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
        duration.subsec_millis(),
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn event_serializes_required_fields_only() {
        let event = RuntimeEvent::new(EventLevel::Fatal, "end_of_input");
        let line = event.to_jsonl().unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["level"], "fatal");
        assert_eq!(v["event"], "end_of_input");
        assert!(v.get("mode").is_none());
        assert!(v.get("healing_action").is_none());
    }

    #[test]
    fn heal_event_carries_context() {
        let event = RuntimeEvent::new(EventLevel::Warn, "heal")
            .with_mode(RuntimeMode::Hardened)
            .with_symbol("getInteger")
            .with_healing(&HealingAction::ReturnSafeDefault)
            .with_message("expected integer input but found 'abc'");
        let v: serde_json::Value = serde_json::from_str(&event.to_jsonl().unwrap()).unwrap();
        assert_eq!(v["mode"], "hardened");
        assert_eq!(v["symbol"], "getInteger");
        assert_eq!(v["healing_action"], "return_safe_default");
    }

    #[test]
    fn log_assigns_increasing_sequence_numbers() {
        let buf = SharedBuf::default();
        let mut log = EventLog::from_writer(Box::new(buf.clone()));
        log.record(RuntimeEvent::new(EventLevel::Warn, "heal")).unwrap();
        log.record(RuntimeEvent::new(EventLevel::Fatal, "fatal")).unwrap();
        assert_eq!(log.seq(), 2);

        let text = String::from_utf8(buf.0.lock().clone()).unwrap();
        let seqs: Vec<u64> = text
            .lines()
            .map(|l| serde_json::from_str::<RuntimeEvent>(l).unwrap().seq)
            .collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn civil_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(20_741), (2026, 10, 15));
    }

    #[test]
    fn timestamp_shape() {
        let ts = now_utc();
        assert_eq!(ts.len(), "2026-10-15T00:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
    }
}
