//! Shared internal utilities for ABI adapters.

use std::ffi::{c_char, c_int};

/// Length of a NUL-terminated C string, like `strlen`.
///
/// # Safety
///
/// `ptr` must point at a readable, NUL-terminated string.
pub unsafe fn c_string_len(ptr: *const c_char) -> usize {
    let mut i = 0usize;
    while unsafe { *ptr.add(i) } != 0 {
        i += 1;
    }
    i
}

/// View a caller-owned C buffer as a byte slice. Null or non-positive
/// capacity yields an empty slice.
///
/// # Safety
///
/// When non-null, `buf` must be writable for `capacity` bytes and not aliased
/// for the lifetime of the returned slice.
pub unsafe fn caller_buffer<'a>(buf: *mut c_char, capacity: usize) -> &'a mut [u8] {
    if buf.is_null() || capacity == 0 {
        return &mut [];
    }
    unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), capacity) }
}

/// Clamp a C `int` capacity to `usize`.
#[inline]
pub fn capacity_from_c(capacity: c_int) -> usize {
    usize::try_from(capacity).unwrap_or(0)
}

/// Clamp a length to a C `int`.
#[inline]
pub fn len_to_c(len: usize) -> c_int {
    c_int::try_from(len).unwrap_or(c_int::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_stops_at_first_nul() {
        let s = b"abc\0def\0";
        assert_eq!(unsafe { c_string_len(s.as_ptr().cast::<c_char>()) }, 3);
        assert_eq!(unsafe { c_string_len(b"\0".as_ptr().cast::<c_char>()) }, 0);
    }

    #[test]
    fn capacities_clamp() {
        assert_eq!(capacity_from_c(-5), 0);
        assert_eq!(capacity_from_c(16), 16);
        assert_eq!(len_to_c(usize::MAX), c_int::MAX);
        assert_eq!(len_to_c(6), 6);
    }

    #[test]
    fn null_buffer_is_empty() {
        let slice = unsafe { caller_buffer(std::ptr::null_mut(), 64) };
        assert!(slice.is_empty());
    }
}
