use std::f32::consts::TAU;

use crate::config::LayoutConfig;
use crate::model::Point;

pub fn ring_radius(level: usize, config: &LayoutConfig) -> f32 {
    config.base_radius + level as f32 * config.radius_step
}

/// Number of evenly spaced angles tried on ring `level` when placing a batch
/// of `n` items. Outer rings and larger batches get denser rings.
pub fn ring_angle_count(level: usize, n: usize, config: &LayoutConfig) -> usize {
    config
        .min_angles
        .max(n + level * config.angles_per_level)
        .max(1)
}

/// Candidate centers on ring `level` around `anchor`, starting at angle zero
/// and proceeding counter-clockwise in canvas coordinates.
pub fn ring_candidates(
    anchor: Point,
    level: usize,
    n: usize,
    config: &LayoutConfig,
) -> impl Iterator<Item = Point> {
    let radius = ring_radius(level, config);
    let count = ring_angle_count(level, n, config);
    (0..count).map(move |idx| {
        let angle = TAU * idx as f32 / count as f32;
        anchor.offset(radius * angle.cos(), radius * angle.sin())
    })
}

/// Position used when no ring yields a safe spot for item `index` of `n`.
pub fn fallback_point(anchor: Point, index: usize, n: usize, config: &LayoutConfig) -> Point {
    let angle = TAU * index as f32 / n.max(1) as f32;
    anchor.offset(
        config.fallback_radius * angle.cos(),
        config.fallback_radius * angle.sin(),
    )
}
