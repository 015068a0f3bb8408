//! In-memory mind map: nodes, parent/child edges, pending expansions and drag
//! bounces.
//!
//! The canvas never talks to the network itself. An expansion is split into
//! `begin_expansion` (returns the prompt to send) and `complete_expansion`
//! (takes the raw model text), so several expansions of different parents can
//! be in flight at once while each parent has at most one.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::config::{CanvasConfig, Config, GenerationConfig, LayoutConfig};
use crate::error::CanvasError;
use crate::extract::extract_items_with_config;
use crate::generate::{GenerationOptions, Generator, Prompt, expansion_prompt};
use crate::layout::{
    CanvasBounds, DragBounce, arrange_around_detailed, circles_collide, clamp_to_canvas,
    ring_candidates,
};
use crate::model::{CircleNode, DEFAULT_ITEM_TYPE, Edge, Item, Node, NodeContent, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionRequest {
    pub parent_id: String,
    pub prompt: Prompt,
    pub options: GenerationOptions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// The drop position was free and is final.
    Settled(Point),
    /// The node overlaps another one and will bounce back once
    /// `settle_drags` runs after the configured delay.
    Bouncing { impact: Point },
}

/// The parts of a canvas that undo/redo restores.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSnapshot {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    bounds: CanvasBounds,
    next_id: u64,
    pending: BTreeMap<String, usize>,
    bounces: Vec<DragBounce>,
    selection: BTreeSet<String>,
}

/// Diameter for a node showing `text`, growing with its length.
pub fn node_size(text: &str, config: &CanvasConfig) -> f32 {
    let chars = text.trim().chars().count() as f32;
    (config.min_node_size + chars * config.size_per_char)
        .clamp(config.min_node_size, config.max_node_size.max(config.min_node_size))
}

impl Canvas {
    pub fn new(bounds: CanvasBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        edges: Vec<Edge>,
        bounds: CanvasBounds,
    ) -> Self {
        let nodes: BTreeMap<String, Node> = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        let next_id = nodes
            .keys()
            .filter_map(|id| id.strip_prefix("node-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            nodes,
            edges,
            bounds,
            next_id,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    /// Called once the viewport has been measured and on every resize.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.bounds = CanvasBounds::new(width, height);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| node.parent_id.as_deref() == Some(id))
            .collect()
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("node-{}", self.next_id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, CanvasError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_string()))
    }

    /// Adds a free-standing node with its top-left corner at `position`.
    pub fn add_node(&mut self, text: &str, position: Point, config: &CanvasConfig) -> String {
        let size = node_size(text, config);
        self.insert(NodeContent::from_text(text), DEFAULT_ITEM_TYPE, position, size, None)
    }

    /// Adds a root idea centered on `center`.
    pub fn add_root(&mut self, text: &str, center: Point, config: &CanvasConfig) -> String {
        let size = config.root_size;
        let position = center.offset(-size / 2.0, -size / 2.0);
        self.insert(NodeContent::from_text(text), DEFAULT_ITEM_TYPE, position, size, None)
    }

    fn insert(
        &mut self,
        content: NodeContent,
        item_type: &str,
        position: Point,
        size: f32,
        parent_id: Option<String>,
    ) -> String {
        let id = self.allocate_id();
        self.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                position,
                size,
                content,
                item_type: item_type.to_string(),
                parent_id,
                minimized: false,
            },
        );
        id
    }

    /// Circles of every visible node other than `exclude_id`, in id order.
    pub fn obstacles(&self, exclude_id: Option<&str>) -> Vec<CircleNode> {
        self.nodes
            .values()
            .filter(|node| !node.minimized && Some(node.id.as_str()) != exclude_id)
            .map(Node::as_circle)
            .collect()
    }

    pub fn is_expanding(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn begin_expansion(
        &mut self,
        parent_id: &str,
        count: usize,
        config: &GenerationConfig,
    ) -> Result<ExpansionRequest, CanvasError> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| CanvasError::UnknownNode(parent_id.to_string()))?;
        if self.pending.contains_key(parent_id) {
            log::warn!("ignoring duplicate expansion of {parent_id}");
            return Err(CanvasError::ExpansionInFlight(parent_id.to_string()));
        }
        let options = GenerationOptions::from_config(count, config);
        let prompt = expansion_prompt(&parent.content.full, &options);
        self.pending.insert(parent_id.to_string(), count);
        Ok(ExpansionRequest {
            parent_id: parent_id.to_string(),
            prompt,
            options,
        })
    }

    /// Drops the in-flight mark after a failed generation call.
    pub fn abandon_expansion(&mut self, parent_id: &str) -> bool {
        self.pending.remove(parent_id).is_some()
    }

    /// Turns the model's raw text into child nodes around the parent. An
    /// unreadable response creates nothing and returns an empty list.
    pub fn complete_expansion(
        &mut self,
        parent_id: &str,
        raw_text: &str,
        config: &Config,
    ) -> Result<Vec<String>, CanvasError> {
        let count = self
            .pending
            .remove(parent_id)
            .ok_or_else(|| CanvasError::NoExpansionPending(parent_id.to_string()))?;
        if !self.nodes.contains_key(parent_id) {
            return Err(CanvasError::UnknownNode(parent_id.to_string()));
        }
        let items = extract_items_with_config(raw_text, count, &config.extract);
        if items.is_empty() {
            log::warn!("expansion of {parent_id} produced no usable items");
            return Ok(Vec::new());
        }
        Ok(self.attach_children(parent_id, &items, config))
    }

    /// Runs a whole expansion synchronously through `generator`.
    pub fn expand(
        &mut self,
        parent_id: &str,
        count: usize,
        generator: &dyn Generator,
        config: &Config,
    ) -> Result<Vec<String>, CanvasError> {
        let request = self.begin_expansion(parent_id, count, &config.generation)?;
        match generator.generate(&request.prompt, &request.options) {
            Ok(raw) => self.complete_expansion(parent_id, &raw, config),
            Err(err) => {
                self.abandon_expansion(parent_id);
                Err(err.into())
            }
        }
    }

    fn attach_children(&mut self, parent_id: &str, items: &[Item], config: &Config) -> Vec<String> {
        let Some(anchor) = self.nodes.get(parent_id).map(Node::center) else {
            return Vec::new();
        };
        let sizes: Vec<f32> = items
            .iter()
            .map(|item| node_size(&item.full, &config.canvas))
            .collect();
        // Search with the largest child so every child clears its neighbours.
        let layout = LayoutConfig {
            new_item_size: sizes.iter().copied().fold(0.0, f32::max),
            ..config.layout.clone()
        };
        let obstacles = self.obstacles(Some(parent_id));
        let placements = arrange_around_detailed(
            anchor,
            items.len(),
            &obstacles,
            Some(parent_id),
            self.bounds,
            &layout,
        );
        let mut created = Vec::with_capacity(items.len());
        for ((item, placement), size) in items.iter().zip(placements).zip(sizes) {
            let position = clamp_to_canvas(
                placement.center.offset(-size / 2.0, -size / 2.0),
                size,
                self.bounds,
                config.layout.edge_padding,
            );
            let id = self.insert(
                NodeContent::from(item),
                &item.item_type,
                position,
                size,
                Some(parent_id.to_string()),
            );
            self.edges.push(Edge {
                from: parent_id.to_string(),
                to: id.clone(),
            });
            created.push(id);
        }
        created
    }

    pub fn toggle_minimized(&mut self, id: &str) -> Result<bool, CanvasError> {
        let node = self.node_mut(id)?;
        node.minimized = !node.minimized;
        Ok(node.minimized)
    }

    /// Removes a node and its edges. Children stay on the canvas as roots.
    pub fn delete_node(&mut self, id: &str) -> Result<Node, CanvasError> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_string()))?;
        self.edges.retain(|edge| edge.from != id && edge.to != id);
        for child in self.nodes.values_mut() {
            if child.parent_id.as_deref() == Some(id) {
                child.parent_id = None;
            }
        }
        self.pending.remove(id);
        self.bounces.retain(|bounce| bounce.node_id != id);
        self.selection.remove(id);
        Ok(node)
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), CanvasError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Finishes a drag of `id` that started at top-left `origin`.
    pub fn drop_node(
        &mut self,
        id: &str,
        drop_position: Point,
        origin: Point,
        now: Duration,
        config: &Config,
    ) -> Result<DropOutcome, CanvasError> {
        let node = self.node_mut(id)?;
        node.position = drop_position;
        let circle = node.as_circle();
        self.bounces.retain(|bounce| bounce.node_id != id);
        if circle.minimized || !self.collides_with_others(&circle, config.layout.buffer) {
            return Ok(DropOutcome::Settled(drop_position));
        }
        self.bounces.push(DragBounce::begin(
            id,
            drop_position,
            origin,
            now,
            Duration::from_millis(config.canvas.bounce_delay_ms),
        ));
        Ok(DropOutcome::Bouncing {
            impact: drop_position,
        })
    }

    pub fn pending_bounces(&self) -> &[DragBounce] {
        &self.bounces
    }

    /// Moves every bounced node whose delay has elapsed back to its origin,
    /// or to the nearest free spot if the origin has been taken meanwhile.
    /// Returns the settled nodes with their final positions.
    pub fn settle_drags(&mut self, now: Duration, config: &Config) -> Vec<(String, Point)> {
        let mut bounces = std::mem::take(&mut self.bounces);
        let mut settled = Vec::new();
        for bounce in &mut bounces {
            let Some(size) = self.nodes.get(&bounce.node_id).map(|node| node.size) else {
                continue;
            };
            let id = bounce.node_id.clone();
            let resolved = bounce.poll(now, |origin| {
                self.safe_return_position(&id, origin, size, &config.layout)
            });
            if let Some(position) = resolved {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.position = position;
                }
                settled.push((id, position));
            }
        }
        bounces.retain(|bounce| !bounce.is_resolved());
        self.bounces = bounces;
        settled
    }

    fn collides_with_others(&self, circle: &CircleNode, buffer: f32) -> bool {
        self.nodes
            .values()
            .filter(|other| !other.minimized && other.id != circle.id)
            .any(|other| {
                circles_collide(circle.center, circle.size, other.center(), other.size, buffer)
            })
    }

    /// Top-left position a bounced node returns to: its origin when free,
    /// otherwise the first ring slot around the origin that is still clear
    /// after clamping to the canvas. Falls back to the origin when every slot
    /// is taken.
    fn safe_return_position(
        &self,
        id: &str,
        origin: Point,
        size: f32,
        layout: &LayoutConfig,
    ) -> Point {
        let half = size / 2.0;
        let is_free = |position: Point| {
            let circle = CircleNode::new(id, position.offset(half, half), size);
            !self.collides_with_others(&circle, layout.buffer)
        };
        if is_free(origin) {
            return origin;
        }
        let anchor = origin.offset(half, half);
        let found = (0..layout.radius_levels)
            .flat_map(|level| ring_candidates(anchor, level, 1, layout))
            .map(|center| {
                clamp_to_canvas(
                    center.offset(-half, -half),
                    size,
                    self.bounds,
                    layout.edge_padding,
                )
            })
            .find(|position| is_free(*position));
        found.unwrap_or_else(|| {
            log::debug!("no free spot near the drag origin of {id}; reusing origin");
            origin
        })
    }

    pub fn select(&mut self, id: &str) -> Result<(), CanvasError> {
        if !self.nodes.contains_key(id) {
            return Err(CanvasError::UnknownNode(id.to_string()));
        }
        self.selection.insert(id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            next_id: self.next_id,
        }
    }

    /// Restores nodes and edges. Bounds, pending expansions and bounces are
    /// left alone; selections and bounces of vanished nodes are dropped.
    pub fn restore(&mut self, snapshot: CanvasSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.next_id = self.next_id.max(snapshot.next_id);
        let nodes = &self.nodes;
        self.selection.retain(|id| nodes.contains_key(id));
        self.bounces.retain(|bounce| nodes.contains_key(&bounce.node_id));
    }
}
