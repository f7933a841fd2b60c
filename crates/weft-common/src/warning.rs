//! Deduplicated warnings for unsupported or malformed style values.
//!
//! A page usually repeats the same unsupported value on many boxes, so every
//! unique `(component, message)` pair is emitted once per process. Output
//! goes through the `log` facade at `warn` level.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (emits once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported unit 'vmin' in width: 10vmin");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        log::warn!(target: "weft", "[{component}] {message}");
    }
}

/// Returns true if `warn_once` has already emitted this message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when loading a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_message() {
        warn_once("TEST", "unsupported thing 'a'");
        assert!(was_warned("TEST", "unsupported thing 'a'"));
        assert!(!was_warned("TEST", "unsupported thing 'b'"));
    }
}
