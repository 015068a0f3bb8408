use serde_json::Value;

use crate::model::{DEFAULT_ITEM_TYPE, Item, first_token};

/// Fields consulted for an object's main text, highest priority first.
const FULL_TEXT_KEYS: [&str; 4] = ["full", "text", "description", "phrase"];

/// An entry recovered by one of the strategies, before defaults are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub full: String,
    pub phrase: Option<String>,
    pub short: Option<String>,
    pub emoji: Option<String>,
    pub item_type: Option<String>,
}

impl RawItem {
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            full: text.to_string(),
            phrase: Some(text.to_string()),
            short: Some(first_token(text).to_string()),
            emoji: Some(String::new()),
            item_type: Some(DEFAULT_ITEM_TYPE.to_string()),
        })
    }
}

/// Hydrates every entry of a JSON array. Returns `None` for non-arrays and
/// for arrays with no usable entry.
pub fn hydrate_array(value: &Value) -> Option<Vec<RawItem>> {
    let entries = value.as_array()?;
    let items: Vec<RawItem> = entries.iter().filter_map(hydrate_entry).collect();
    if items.is_empty() { None } else { Some(items) }
}

pub fn hydrate_entry(value: &Value) -> Option<RawItem> {
    match value {
        Value::String(text) => RawItem::from_text(text),
        Value::Object(map) => {
            let full = FULL_TEXT_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))?
                .trim();
            if full.is_empty() {
                return None;
            }
            let field = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };
            Some(RawItem {
                full: full.to_string(),
                phrase: field("phrase"),
                short: field("short"),
                emoji: field("emoji"),
                item_type: field("type"),
            })
        }
        _ => None,
    }
}

pub fn normalize(raw: RawItem) -> Item {
    let short = raw
        .short
        .unwrap_or_else(|| first_token(&raw.full).to_string());
    Item {
        phrase: raw.phrase.unwrap_or_else(|| raw.full.clone()),
        short,
        emoji: raw.emoji.unwrap_or_default(),
        item_type: raw
            .item_type
            .unwrap_or_else(|| DEFAULT_ITEM_TYPE.to_string()),
        full: raw.full,
    }
}
