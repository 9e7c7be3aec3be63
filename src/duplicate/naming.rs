//! Collision-safe name generation for duplicated entities.

use std::collections::HashSet;
use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;

/// Compiled copy-marker patterns keyed by copy text (the text is
/// locale-dependent, so one pattern per text).
static MARKER_PATTERNS: LazyLock<DashMap<String, Regex>> = LazyLock::new(DashMap::new);

fn marker_pattern(copy_text: &str) -> Regex {
    if let Some(pattern) = MARKER_PATTERNS.get(copy_text) {
        return pattern.clone();
    }
    let pattern = Regex::new(&format!(
        r"(?i)\s*\({}(?:\s+(\d+))?\)\s*$",
        regex::escape(copy_text)
    ))
    .expect("escaped marker pattern is valid");
    MARKER_PATTERNS.insert(copy_text.to_string(), pattern.clone());
    pattern
}

/// Append a parenthesized counted copy marker: `"Doc"` → `"Doc (Copy)"`,
/// `"Doc (Copy)"` → `"Doc (Copy 2)"`, `"Doc (Copy 7)"` → `"Doc (Copy 8)"`.
/// An existing marker is parsed and incremented, never nested.
pub fn counted_copy(value: &str, copy_text: &str) -> String {
    let pattern = marker_pattern(copy_text);
    match pattern.captures(value) {
        Some(captures) => {
            let current: u64 = captures
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let base = pattern.replace(value, "");
            format!("{} ({} {})", base, copy_text, current + 1)
        }
        None => format!("{} ({})", value, copy_text),
    }
}

/// Append `suffix` to `base`, counting upwards until the result is absent
/// from the `existing` snapshot: `"Report"` + `" copy"` against
/// `{"Report copy", "Report copy 2"}` yields `"Report copy 3"`.
///
/// Two concurrent callers working from the same snapshot can compute the
/// same name; resolving that collision is left to the storage layer.
pub fn unique_name(base: &str, suffix: &str, existing: &HashSet<String>) -> String {
    let first = format!("{base}{suffix}");
    if !existing.contains(&first) {
        return first;
    }
    let mut counter = 2u64;
    loop {
        let candidate = format!("{base}{suffix} {counter}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
