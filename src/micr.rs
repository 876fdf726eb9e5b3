//! Bank-check MICR line detection.
//!
//! Checks carry routing, account and check-number keys on the MICR line. The
//! routing key reads as `a<digits>a`, with six to nine digits between the
//! transit symbols, which OCR renders as a literal `a`.
use regex::Regex;
use std::sync::LazyLock;

pub const MICR_PATTERN: &str = "a[0-9]{6,9}a";

static MICR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MICR_PATTERN).expect("valid MICR regex"));

/// True when `value` contains a MICR routing marker anywhere.
pub fn is_micr(value: &str) -> bool {
    MICR_RE.is_match(value)
}

/// The first marker found in `value`, if any.
pub fn find_micr(value: &str) -> Option<&str> {
    MICR_RE.find(value).map(|m| m.as_str())
}
