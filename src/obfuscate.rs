//! Reversible scrambling for locally remembered repository coordinates.
//!
//! This is obfuscation only. It keeps values from being readable at a glance
//! in `state.json`; anyone with access to the file can recover them. Do not
//! use it for secrets.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Length of the millisecond timestamp suffix.
const STAMP_LEN: usize = 13;

/// `base64(reverse(text) ++ zero-padded millis)`.
pub fn obfuscate(text: &str, now_millis: u128) -> String {
    let mut scrambled: String = text.chars().rev().collect();
    scrambled.push_str(&format!("{:0width$}", now_millis, width = STAMP_LEN));
    STANDARD.encode(scrambled)
}

/// Inverse of [`obfuscate`]. Anything that does not decode yields an empty string.
pub fn deobfuscate(encoded: &str) -> String {
    let Ok(bytes) = STANDARD.decode(encoded.trim()) else {
        return String::new();
    };
    let Ok(decoded) = String::from_utf8(bytes) else {
        return String::new();
    };
    let count = decoded.chars().count();
    if count < STAMP_LEN {
        return String::new();
    }
    let kept: Vec<char> = decoded.chars().take(count - STAMP_LEN).collect();
    kept.into_iter().rev().collect()
}

pub fn now_millis() -> u128 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u128::try_from(nanos / 1_000_000).unwrap_or_default()
}
