//! Series UID generation and format checks.

use std::sync::OnceLock;

use regex::Regex;

const GUID_PATTERN: &str = r"^(\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}|[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12})$";

fn guid_regex() -> Option<&'static Regex> {
    static GUID: OnceLock<Option<Regex>> = OnceLock::new();
    GUID.get_or_init(|| Regex::new(GUID_PATTERN).ok()).as_ref()
}

/// A fresh series UID in the dashed 8-4-4-4-12 form.
pub fn new_series_uid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

/// True for a 32-hex-digit GUID in dashed form, optionally wrapped in braces.
pub fn is_valid_series_uid(value: &str) -> bool {
    guid_regex().is_some_and(|re| re.is_match(value))
}
