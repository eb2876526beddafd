//! Zero-copy string/byte views.
//!
//! Both helpers borrow from their input, so the result can never outlive or
//! observe a mutation of the source.

use std::str::Utf8Error;

/// Views UTF-8 bytes as a `&str` without copying.
pub fn bytes_to_str(bytes: &[u8]) -> Result<&str, Utf8Error> {
    std::str::from_utf8(bytes)
}

/// Views a string's bytes without copying.
pub fn str_to_bytes(s: &str) -> &[u8] {
    s.as_bytes()
}
