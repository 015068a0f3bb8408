use once_cell::sync::Lazy;
use regex::Regex;

use super::hydrate::{RawItem, hydrate_array};

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").unwrap());
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*?\]").unwrap());
static SINGLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'([^']*)'").unwrap());
static LINE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|•").unwrap());
static LIST_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s\-*\d.)]+").unwrap());

/// pest recurses once per nesting level; deeper input is left to the line fallback.
const JSON5_MAX_DEPTH: usize = 64;

/// Text views shared by every strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    /// Interior of the first fenced block, or the whole trimmed text.
    pub interior: String,
    /// Texts to try as JSON, most specific first.
    pub candidates: Vec<String>,
}

impl Prepared {
    pub fn new(text: &str) -> Self {
        let interior = strip_fence(text);
        let mut candidates = Vec::with_capacity(2);
        if let Some(bracketed) = isolate_brackets(&interior) {
            candidates.push(bracketed.to_string());
        }
        if candidates.first().map(String::as_str) != Some(interior.as_str()) {
            candidates.push(interior.clone());
        }
        Self {
            interior,
            candidates,
        }
    }
}

pub fn strip_fence(text: &str) -> String {
    FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim().to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

/// First minimal `[...]` span. Nested arrays are cut at the first `]`.
pub fn isolate_brackets(text: &str) -> Option<&str> {
    BRACKET_RE.find(text).map(|found| found.as_str())
}

pub fn swap_single_quotes(text: &str) -> String {
    SINGLE_QUOTED_RE.replace_all(text, "\"$1\"").into_owned()
}

pub fn strict_json(prepared: &Prepared) -> Option<Vec<RawItem>> {
    prepared.candidates.iter().find_map(|candidate| {
        serde_json::from_str::<serde_json::Value>(candidate)
            .ok()
            .and_then(|value| hydrate_array(&value))
    })
}

pub fn quote_swapped_json(prepared: &Prepared) -> Option<Vec<RawItem>> {
    prepared.candidates.iter().find_map(|candidate| {
        if !candidate.contains('\'') {
            return None;
        }
        serde_json::from_str::<serde_json::Value>(&swap_single_quotes(candidate))
            .ok()
            .and_then(|value| hydrate_array(&value))
    })
}

/// JSON5 accepts what the naive quote swap mangles: apostrophes inside
/// single-quoted strings, unquoted keys, trailing commas.
pub fn lenient_json5(prepared: &Prepared) -> Option<Vec<RawItem>> {
    prepared.candidates.iter().find_map(|candidate| {
        if nesting_depth(candidate) > JSON5_MAX_DEPTH {
            return None;
        }
        json5::from_str::<serde_json::Value>(candidate)
            .ok()
            .and_then(|value| hydrate_array(&value))
    })
}

pub fn line_items(prepared: &Prepared) -> Option<Vec<RawItem>> {
    let items: Vec<RawItem> = LINE_SPLIT_RE
        .split(&prepared.interior)
        .filter(|line| !line.trim_start().starts_with("```"))
        .filter_map(|line| RawItem::from_text(&LIST_MARKER_RE.replace(line, "")))
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    for ch in text.chars() {
        match ch {
            '[' | '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_with_language_tag() {
        assert_eq!(strip_fence("Here:\n```json\n[1]\n```\nbye"), "[1]");
        assert_eq!(strip_fence("```\nplain\n```"), "plain");
        assert_eq!(strip_fence("  no fence  "), "no fence");
    }

    #[test]
    fn bracket_match_is_minimal() {
        assert_eq!(isolate_brackets("a [1, 2] b [3]"), Some("[1, 2]"));
        assert_eq!(isolate_brackets("none"), None);
    }

    #[test]
    fn nested_arrays_retry_whole_interior() {
        let prepared = Prepared::new(r#"[{"full": "a", "tags": ["x"]}]"#);
        assert_eq!(prepared.candidates.len(), 2);
        let items = strict_json(&prepared).unwrap();
        assert_eq!(items[0].full, "a");
    }

    #[test]
    fn quote_swap_is_naive() {
        assert_eq!(swap_single_quotes("['a', 'b']"), r#"["a", "b"]"#);
    }

    #[test]
    fn json5_handles_apostrophes() {
        let prepared = Prepared::new(r#"[{full: "don't stop"}, {'full': 'keep going',}]"#);
        assert_eq!(quote_swapped_json(&prepared), None);
        let items = lenient_json5(&prepared).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].full, "don't stop");
    }

    #[test]
    fn line_markers_are_stripped() {
        let prepared = Prepared::new("1. alpha\n2) beta\n* gamma\n• delta\n\n   \n- epsilon");
        let lines: Vec<String> = line_items(&prepared)
            .unwrap()
            .into_iter()
            .map(|item| item.full)
            .collect();
        assert_eq!(lines, ["alpha", "beta", "gamma", "delta", "epsilon"]);
    }

    #[test]
    fn deep_nesting_skips_json5() {
        let deep = "[".repeat(500);
        let prepared = Prepared::new(&deep);
        assert_eq!(lenient_json5(&prepared), None);
    }
}
