//! Placement of new nodes around an anchor without overlapping the nodes
//! already on the canvas.
//!
//! The search walks concentric rings outward from the anchor and accepts the
//! first candidate that clears every obstacle and every point placed earlier
//! in the same batch. When every ring is blocked the item falls back to a
//! fixed spot on a circle around the anchor, so a call always returns one
//! position per requested item and never fails.

pub mod collision;
pub mod drag;
pub mod rings;

pub use collision::{
    COLLISION_BUFFER, circles_collide, collision_threshold, is_safe, nodes_collide,
};
pub use drag::{Clock, DragBounce, DragPhase, ManualClock, SystemClock};
pub use rings::{fallback_point, ring_angle_count, ring_candidates, ring_radius};

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::{CircleNode, Point};

/// Canvas dimensions. Zero means "not measured yet" and disables clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
}

impl CanvasBounds {
    pub const UNKNOWN: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Center of the placed item after clamping.
    pub center: Point,
    /// Top-left corner of the placed item after clamping.
    pub position: Point,
    /// Set when no ring had room and the fixed fallback spot was used.
    pub fallback: bool,
}

/// Top-left positions for `n` new items of diameter `config.new_item_size`
/// arranged around `anchor`.
pub fn arrange_around(
    anchor: Point,
    n: usize,
    obstacles: &[CircleNode],
    exclude_id: Option<&str>,
    bounds: CanvasBounds,
    config: &LayoutConfig,
) -> Vec<Point> {
    arrange_around_detailed(anchor, n, obstacles, exclude_id, bounds, config)
        .into_iter()
        .map(|placement| placement.position)
        .collect()
}

pub fn arrange_around_detailed(
    anchor: Point,
    n: usize,
    obstacles: &[CircleNode],
    exclude_id: Option<&str>,
    bounds: CanvasBounds,
    config: &LayoutConfig,
) -> Vec<Placement> {
    if n == 0 {
        return Vec::new();
    }
    let size = config.new_item_size;
    let active: Vec<&CircleNode> = obstacles
        .iter()
        .filter(|node| !node.minimized && Some(node.id.as_str()) != exclude_id)
        .collect();

    let mut accepted: Vec<Point> = Vec::with_capacity(n);
    let mut placements = Vec::with_capacity(n);
    for index in 0..n {
        let found = (0..config.radius_levels).find_map(|level| {
            ring_candidates(anchor, level, n, config)
                .find(|candidate| is_safe(*candidate, size, &active, &accepted, config.buffer))
        });
        let (center, fallback) = match found {
            Some(center) => (center, false),
            None => {
                log::debug!("no free ring slot for item {index} of {n}; using fallback spot");
                (fallback_point(anchor, index, n, config), true)
            }
        };
        accepted.push(center);

        let position = clamp_to_canvas(
            center.offset(-size / 2.0, -size / 2.0),
            size,
            bounds,
            config.edge_padding,
        );
        placements.push(Placement {
            center: position.offset(size / 2.0, size / 2.0),
            position,
            fallback,
        });
    }
    placements
}

/// Keeps a node of diameter `size` with top-left `position` inside the canvas,
/// `padding` away from every edge. Returns the position untouched while the
/// canvas has not been measured.
pub fn clamp_to_canvas(position: Point, size: f32, bounds: CanvasBounds, padding: f32) -> Point {
    if !bounds.is_known() {
        return position;
    }
    let max_x = (bounds.width - size - padding).max(padding);
    let max_y = (bounds.height - size - padding).max(padding);
    Point::new(
        position.x.max(padding).min(max_x),
        position.y.max(padding).min(max_y),
    )
}
