//! Usable-string guard.
//!
//! Every name and value that takes part in persistence passes through here.
//! A value is usable when it is present and non-empty; missing values
//! (`None`, the equivalent of an undefined or null field) and empty strings
//! are treated the same and silently excluded.

/// Returns `true` when `value` is present and non-empty.
#[must_use]
pub fn is_usable(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Returns the value back if it is usable, `None` otherwise.
#[must_use]
pub fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
