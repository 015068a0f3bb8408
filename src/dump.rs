use crate::canvas::Canvas;
use crate::layout::CanvasBounds;
use crate::model::{Edge, Node, NodeContent, Point};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub full: String,
    #[serde(default)]
    pub phrase: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(rename = "type", default = "default_type")]
    pub item_type: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub minimized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
}

fn default_type() -> String {
    crate::model::DEFAULT_ITEM_TYPE.to_string()
}

impl CanvasDump {
    pub fn from_canvas(canvas: &Canvas) -> Self {
        let nodes = canvas
            .nodes()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                size: node.size,
                full: node.content.full.clone(),
                phrase: node.content.phrase.clone(),
                short: node.content.short.clone(),
                emoji: node.content.emoji.clone(),
                item_type: node.item_type.clone(),
                parent_id: node.parent_id.clone(),
                minimized: node.minimized,
            })
            .collect();

        let edges = canvas
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
            })
            .collect();

        let bounds = canvas.bounds();
        CanvasDump {
            width: bounds.width,
            height: bounds.height,
            nodes,
            edges,
        }
    }

    pub fn into_canvas(self) -> Canvas {
        let nodes = self.nodes.into_iter().map(|node| {
            let mut content = NodeContent::from_text(&node.full);
            if !node.phrase.is_empty() {
                content.phrase = node.phrase;
            }
            if !node.short.is_empty() {
                content.short = node.short;
            }
            content.emoji = node.emoji;
            Node {
                id: node.id,
                position: Point::new(node.x, node.y),
                size: node.size,
                content,
                item_type: node.item_type,
                parent_id: node.parent_id,
                minimized: node.minimized,
            }
        });
        let edges = self
            .edges
            .into_iter()
            .map(|edge| Edge {
                from: edge.from,
                to: edge.to,
            })
            .collect();
        Canvas::from_parts(nodes, edges, CanvasBounds::new(self.width, self.height))
    }
}

pub fn write_canvas_dump(path: &Path, canvas: &Canvas) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = CanvasDump::from_canvas(canvas);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn read_canvas_dump(path: &Path) -> anyhow::Result<Canvas> {
    let file = File::open(path)?;
    let dump: CanvasDump = serde_json::from_reader(BufReader::new(file))?;
    Ok(dump.into_canvas())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;

    #[test]
    fn dump_preserves_structure() {
        let config = CanvasConfig::default();
        let mut canvas = Canvas::new(CanvasBounds::new(800.0, 600.0));
        let a = canvas.add_node("first idea", Point::new(10.0, 20.0), &config);
        canvas.toggle_minimized(&a).unwrap();

        let dump = CanvasDump::from_canvas(&canvas);
        assert_eq!(dump.width, 800.0);
        assert_eq!(dump.nodes.len(), 1);
        assert!(dump.nodes[0].minimized);

        let json = serde_json::to_string(&dump).unwrap();
        let restored: CanvasDump = serde_json::from_str(&json).unwrap();
        let mut canvas = restored.into_canvas();
        assert_eq!(canvas.node(&a).unwrap().content.short, "first");
        let next = canvas.add_node("second", Point::new(0.0, 0.0), &config);
        assert_eq!(next, "node-2");
    }

    #[test]
    fn sparse_dump_fills_defaults() {
        let dump: CanvasDump = serde_json::from_str(
            r#"{"width":0,"height":0,"nodes":[{"id":"root","x":1,"y":2,"size":90,"full":"seed idea"}],"edges":[]}"#,
        )
        .unwrap();
        let canvas = dump.into_canvas();
        let node = canvas.node("root").unwrap();
        assert_eq!(node.item_type, "idea");
        assert_eq!(node.content.phrase, "seed idea");
        assert!(!canvas.bounds().is_known());
    }
}
