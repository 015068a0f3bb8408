use crate::model::{CircleNode, Point};

/// Clearance kept between the edges of two circles on top of their radii.
pub const COLLISION_BUFFER: f32 = 10.0;

/// Minimum center distance for two circles of the given diameters.
pub fn collision_threshold(size_a: f32, size_b: f32, buffer: f32) -> f32 {
    (size_a + size_b) / 2.0 + buffer
}

/// Whether two circular nodes overlap once the default buffer is applied.
///
/// Callers with a configured `LayoutConfig::buffer` go through
/// [`circles_collide`] instead, so drops and placements share one threshold.
pub fn nodes_collide(a: &CircleNode, b: &CircleNode) -> bool {
    circles_collide(a.center, a.size, b.center, b.size, COLLISION_BUFFER)
}

pub fn circles_collide(a: Point, size_a: f32, b: Point, size_b: f32, buffer: f32) -> bool {
    a.distance(b) < collision_threshold(size_a, size_b, buffer)
}

/// Acceptance test for a candidate center of diameter `size`.
///
/// The candidate must clear every obstacle and every point already accepted
/// in the current batch (which share the candidate's diameter).
pub fn is_safe(
    candidate: Point,
    size: f32,
    obstacles: &[&CircleNode],
    accepted: &[Point],
    buffer: f32,
) -> bool {
    let clear_of_obstacles = obstacles.iter().all(|obstacle| {
        candidate.distance(obstacle.center) > collision_threshold(obstacle.size, size, buffer)
    });
    clear_of_obstacles
        && accepted
            .iter()
            .all(|point| candidate.distance(*point) > collision_threshold(size, size, buffer))
}
