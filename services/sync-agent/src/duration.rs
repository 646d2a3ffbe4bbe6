//! Human-readable interval parsing.
//!
//! Accepts a bare integer (seconds) or an integer with a unit suffix from
//! `s`, `m`, `h`, `d`.

use crate::config::ConfigError;

/// Parse an interval string into a whole number of seconds.
///
/// The numeric portion must be a non-negative integer; fractional and
/// negative durations are rejected.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDuration` when the numeric portion does not
/// parse or a trailing unit letter is not one of `s`, `m`, `h`, `d`.
pub fn parse(input: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let (number, scale) = match trimmed.chars().last() {
        Some('s') => (&trimmed[..trimmed.len() - 1], 1),
        Some('m') => (&trimmed[..trimmed.len() - 1], 60),
        Some('h') => (&trimmed[..trimmed.len() - 1], 3600),
        Some('d') => (&trimmed[..trimmed.len() - 1], 86400),
        Some(_) => (trimmed, 1),
        None => return Err(invalid("empty value")),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| invalid("not a whole number of seconds"))?;

    value
        .checked_mul(scale)
        .ok_or_else(|| invalid("overflows seconds"))
}
