use serde::{Deserialize, Serialize};

/// Category assigned to items that carry no explicit `type`.
pub const DEFAULT_ITEM_TYPE: &str = "idea";

/// Conventional categories the generation prompt asks for. `Item::item_type`
/// stays a free string since models invent their own labels.
pub const KNOWN_ITEM_TYPES: [&str; 5] = ["idea", "question", "example", "argument", "counterpoint"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A node reduced to what the layout engine needs: a circle given by its
/// center and diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleNode {
    pub id: String,
    pub center: Point,
    pub size: f32,
    #[serde(default)]
    pub minimized: bool,
}

impl CircleNode {
    pub fn new(id: impl Into<String>, center: Point, size: f32) -> Self {
        Self {
            id: id.into(),
            center,
            size,
            minimized: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Full,
    Phrase,
    Short,
    Emoji,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeContent {
    pub full: String,
    pub phrase: String,
    pub short: String,
    pub emoji: String,
}

impl NodeContent {
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        Self {
            full: text.to_string(),
            phrase: text.to_string(),
            short: first_token(text).to_string(),
            emoji: String::new(),
        }
    }

    /// Text shown at the given zoom level, falling back toward `full` when a
    /// coarser field is blank.
    pub fn at(&self, level: DetailLevel) -> &str {
        let candidate = match level {
            DetailLevel::Full => &self.full,
            DetailLevel::Phrase => &self.phrase,
            DetailLevel::Short => &self.short,
            DetailLevel::Emoji => &self.emoji,
        };
        if candidate.is_empty() {
            &self.full
        } else {
            candidate
        }
    }
}

impl From<&Item> for NodeContent {
    fn from(item: &Item) -> Self {
        Self {
            full: item.full.clone(),
            phrase: item.phrase.clone(),
            short: item.short.clone(),
            emoji: item.emoji.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Top-left corner in canvas space.
    pub position: Point,
    /// Diameter in pixels.
    pub size: f32,
    pub content: NodeContent,
    pub item_type: String,
    pub parent_id: Option<String>,
    pub minimized: bool,
}

impl Node {
    pub fn center(&self) -> Point {
        self.position.offset(self.size / 2.0, self.size / 2.0)
    }

    pub fn as_circle(&self) -> CircleNode {
        CircleNode {
            id: self.id.clone(),
            center: self.center(),
            size: self.size,
            minimized: self.minimized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// One structured entry recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub full: String,
    pub phrase: String,
    pub short: String,
    pub emoji: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

pub fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_falls_back_to_full() {
        let content = NodeContent::from_text("  grow tomatoes indoors ");
        assert_eq!(content.full, "grow tomatoes indoors");
        assert_eq!(content.at(DetailLevel::Short), "grow");
        assert_eq!(content.at(DetailLevel::Emoji), "grow tomatoes indoors");
    }

    #[test]
    fn center_is_offset_by_radius() {
        let node = Node {
            id: "a".to_string(),
            position: Point::new(10.0, 20.0),
            size: 80.0,
            content: NodeContent::from_text("a"),
            item_type: DEFAULT_ITEM_TYPE.to_string(),
            parent_id: None,
            minimized: false,
        };
        assert_eq!(node.center(), Point::new(50.0, 60.0));
    }
}
