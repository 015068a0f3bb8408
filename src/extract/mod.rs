//! Recovery of structured items from free-form model output.
//!
//! Strategies run in a fixed order and the first one producing at least one
//! usable item wins:
//!
//! 1. strict JSON on the bracketed candidate (then the whole interior)
//! 2. the same after swapping single-quoted literals for double-quoted ones
//! 3. JSON5
//! 4. one item per line or bullet
//!
//! Nothing here returns an error. Input no strategy can read yields an empty
//! list.

pub mod hydrate;
pub mod strategies;

pub use hydrate::{RawItem, hydrate_array, hydrate_entry, normalize};
pub use strategies::Prepared;

use crate::config::ExtractConfig;
use crate::model::Item;

pub const DEFAULT_MAX_ITEMS: usize = 5;

type Strategy = fn(&Prepared) -> Option<Vec<RawItem>>;

// json5 sits between the quote swap and the line split, so trailing commas
// and comments still yield structured items (`["a","b",]` gives two items).

const STRATEGIES: [(&str, Strategy); 4] = [
    ("strict-json", strategies::strict_json),
    ("quote-swapped-json", strategies::quote_swapped_json),
    ("json5", strategies::lenient_json5),
    ("lines", strategies::line_items),
];

/// At most `max_count` items from `text`; a `max_count` of zero means
/// [`DEFAULT_MAX_ITEMS`].
pub fn extract_items(text: &str, max_count: usize) -> Vec<Item> {
    extract_items_limited(text, max_count, DEFAULT_MAX_ITEMS)
}

pub fn extract_items_with_config(
    text: &str,
    max_count: usize,
    config: &ExtractConfig,
) -> Vec<Item> {
    extract_items_limited(text, max_count, config.default_max_items)
}

/// Entry point for callers holding possibly-missing text (e.g. a response
/// body without content). Missing text behaves like blank text.
pub fn extract_items_from(text: Option<&str>, max_count: usize) -> Vec<Item> {
    text.map(|text| extract_items(text, max_count))
        .unwrap_or_default()
}

/// Raw items from the first strategy that succeeds, together with its name.
pub fn first_success(prepared: &Prepared) -> Option<(&'static str, Vec<RawItem>)> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(prepared)
            .filter(|items| !items.is_empty())
            .map(|items| (*name, items))
    })
}

fn extract_items_limited(text: &str, max_count: usize, default_max: usize) -> Vec<Item> {
    let limit = if max_count == 0 {
        default_max.max(1)
    } else {
        max_count
    };
    let prepared = Prepared::new(text);
    let Some((strategy, raw)) = first_success(&prepared) else {
        log::debug!("no extraction strategy matched {} bytes of input", text.len());
        return Vec::new();
    };
    log::debug!("{strategy} produced {} items (limit {limit})", raw.len());
    raw.into_iter().map(normalize).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fulls(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.full.as_str()).collect()
    }

    #[test]
    fn prose_wrapped_array() {
        let text = "Sure! Here are some ideas:\n[\"plant herbs\", \"compost\"]\nHope it helps.";
        let items = extract_items(text, 5);
        assert_eq!(fulls(&items), ["plant herbs", "compost"]);
        assert_eq!(items[0].short, "plant");
    }

    #[test]
    fn zero_limit_uses_default() {
        let text = r#"["a","b","c","d","e","f","g"]"#;
        assert_eq!(extract_items(text, 0).len(), DEFAULT_MAX_ITEMS);
        let config = ExtractConfig {
            default_max_items: 3,
        };
        assert_eq!(extract_items_with_config(text, 0, &config).len(), 3);
    }

    #[test]
    fn missing_text_is_empty() {
        assert!(extract_items_from(None, 3).is_empty());
        assert_eq!(extract_items_from(Some("- one"), 3).len(), 1);
    }

    #[test]
    fn empty_json_array_falls_through_to_lines() {
        let items = extract_items("[]", 3);
        assert_eq!(fulls(&items), ["[]"]);
    }

    #[test]
    fn trailing_comma_is_read_as_json5() {
        let prepared = Prepared::new(r#"["a","b",]"#);
        let (name, raw) = first_success(&prepared).unwrap();
        assert_eq!(name, "json5");
        assert_eq!(raw.len(), 2);
        assert_eq!(fulls(&extract_items(r#"["a","b",]"#, 5)), ["a", "b"]);
    }

    #[test]
    fn strategy_name_is_reported() {
        let prepared = Prepared::new("[{'full': 'x'}]");
        let (name, _) = first_success(&prepared).unwrap();
        assert_eq!(name, "quote-swapped-json");
    }
}
