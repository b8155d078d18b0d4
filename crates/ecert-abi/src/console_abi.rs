//! Console I/O exports: `get*`, `put*` and the runtime control calls.
//!
//! All calls share one process-wide console over stdin/stdout. A failure the
//! active mode does not heal prints its diagnostic and exits with status 1.

use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_ulonglong};
use std::io::{BufReader, Stdin, Stdout};
use std::sync::OnceLock;

use ecert_core::{Console, DEFAULT_STRING_CAPACITY, RuntimeError};
use ecert_membrane::{RuntimeConfig, global_healing_policy};
use parking_lot::Mutex;

use crate::macros::abi_fn;
use crate::util::{c_string_len, caller_buffer, capacity_from_c, len_to_c};

pub(crate) type StdConsole = Console<BufReader<Stdin>, Stdout>;

fn console() -> &'static Mutex<StdConsole> {
    static CONSOLE: OnceLock<Mutex<StdConsole>> = OnceLock::new();
    CONSOLE.get_or_init(|| {
        Mutex::new(Console::new(
            BufReader::new(std::io::stdin()),
            std::io::stdout(),
            RuntimeConfig::from_env(),
        ))
    })
}

/// Run `op` on the process console; terminate on error.
pub(crate) fn with_console<T>(
    symbol: &'static str,
    op: impl FnOnce(&mut StdConsole) -> Result<T, RuntimeError>,
) -> T {
    let mut console = console().lock();
    match op(&mut console) {
        Ok(value) => value,
        Err(err) => terminate(&mut console, symbol, &err),
    }
}

/// Print the diagnostic for `err` and exit with `EXIT_FAILURE`.
pub(crate) fn terminate(console: &mut StdConsole, symbol: &str, err: &RuntimeError) -> ! {
    // stdout may already be gone; the exit status still reports the failure.
    let _ = console.report_fatal(symbol, err);
    std::process::exit(libc::EXIT_FAILURE)
}

thread_local! {
    static STAGED: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

abi_fn! {
    /// Read a signed 32-bit integer token.
    fn getInteger() -> c_int {
        with_console("getInteger", StdConsole::get_integer)
    }
}

abi_fn! {
    /// Read a boolean as an integer. The value is not range-checked.
    fn getBool() -> c_int {
        with_console("getBool", StdConsole::get_bool)
    }
}

abi_fn! {
    fn getFloat() -> f32 {
        with_console("getFloat", StdConsole::get_float)
    }
}

abi_fn! {
    /// Stage the next token into `buf`, assumed to hold
    /// `ECERT_STRING_CAPACITY` (1024) bytes. Returns token length + 1.
    fn getString(buf: *mut c_char) -> c_int {
        // SAFETY: the header contract requires 1024 writable bytes at `buf`.
        let dst = unsafe { caller_buffer(buf, DEFAULT_STRING_CAPACITY) };
        len_to_c(with_console("getString", |c| c.get_string_into(dst)))
    }
}

abi_fn! {
    /// Stage the next token into `buf` of `capacity` bytes.
    fn getStringBounded(buf: *mut c_char, capacity: c_int) -> c_int {
        // SAFETY: caller guarantees `capacity` writable bytes at `buf`.
        let dst = unsafe { caller_buffer(buf, capacity_from_c(capacity)) };
        len_to_c(with_console("getStringBounded", |c| c.get_string_into(dst)))
    }
}

abi_fn! {
    /// Read the next token into thread-local storage sized to fit it.
    ///
    /// The pointer stays valid until the next call on the same thread.
    fn getStagedString() -> *const c_char {
        let token = with_console("getStagedString", StdConsole::get_string);
        STAGED.with_borrow_mut(|staged| {
            *staged = token;
            staged.push(0);
            staged.as_ptr().cast::<c_char>()
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

abi_fn! {
    fn putInteger(val: c_int) {
        with_console("putInteger", |c| c.put_integer(val))
    }
}

abi_fn! {
    /// Prints `true` for nonzero, `false` for zero.
    fn putBool(val: c_int) {
        with_console("putBool", |c| c.put_bool(val))
    }
}

abi_fn! {
    fn putFloat(val: f32) {
        with_console("putFloat", |c| c.put_float(val))
    }
}

abi_fn! {
    /// Write a NUL-terminated string verbatim. A null pointer writes nothing.
    fn putString(val: *const c_char) {
        if val.is_null() {
            return;
        }
        // SAFETY: non-null `val` points at a NUL-terminated string.
        let bytes = unsafe {
            std::slice::from_raw_parts(val.cast::<u8>(), c_string_len(val))
        };
        with_console("putString", |c| c.put_string(bytes))
    }
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

abi_fn! {
    fn ecertFlush() {
        with_console("ecertFlush", StdConsole::flush)
    }
}

abi_fn! {
    /// Heals recorded in this process so far (hardened mode only).
    fn ecertHealCount() -> c_ulonglong {
        global_healing_policy().total()
    }
}
