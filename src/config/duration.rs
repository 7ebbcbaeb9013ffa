//! Duration strings such as `"1h"`, `"30m"` or `"45s"`.

use super::ConfigError;

/// Parse a duration string into whole seconds.
///
/// The string is a positive integer followed by exactly one unit suffix:
/// `h` (hours), `m` (minutes) or `s` (seconds). Surrounding whitespace is
/// ignored. Anything else is a [`ConfigError::InvalidDuration`] carrying the
/// offending input.
pub fn parse_duration(s: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    let trimmed = s.trim();
    let (digits, multiplier) = if let Some(hours) = trimmed.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(mins) = trimmed.strip_suffix('m') {
        (mins, 60)
    } else if let Some(secs) = trimmed.strip_suffix('s') {
        (secs, 1)
    } else {
        return Err(invalid());
    };

    // u64::from_str accepts a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }

    value.checked_mul(multiplier).ok_or_else(invalid)
}
