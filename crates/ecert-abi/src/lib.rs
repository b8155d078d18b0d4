// Exports take raw pointers from generated C code; the contracts live in
// include/ecert.h.
#![allow(clippy::missing_safety_doc)]
//! # ecert-abi
//!
//! `extern "C"` boundary that compiled programs link against
//! (`libecert.so` / `libecert.a`). Each symbol locks the process console,
//! delegates to `ecert-core`, and turns an unhealed error into the
//! `FATAL ERROR:` diagnostic plus `exit(1)`.
//!
//! ```text
//! C caller -> ABI entry (this crate) -> Console (mode policy) -> core impl
//! ```
//!
//! The symbol set is pinned by `version_scripts/ecert.map` and declared in
//! `include/ecert.h`.

mod macros;

pub mod console_abi;
pub mod util;
pub mod validate_abi;
