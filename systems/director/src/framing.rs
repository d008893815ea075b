//! Framing math: cluster spread, easing curves and centroid helpers.

use replay_director_core::{UnitSnapshot, WorldPoint};

/// Ease-out cubic curve used to soften framing-distance response.
pub(crate) fn ease_out_cubic(x: f32) -> f32 {
    1.0 - (1.0 - x).powi(3)
}

/// Ease-out quintic curve used by the playback-speed damping.
pub(crate) fn ease_out_quint(x: f32) -> f32 {
    1.0 - (1.0 - x).powi(5)
}

/// Linear interpolation between `a` and `b`.
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Largest positional variance a unit set can reach on the given map.
///
/// Per axis the worst case is half the units at each extreme of the extent,
/// which collapses to the squared extent; both axes sum.
pub(crate) fn max_total_variance(width: f32, height: f32) -> f32 {
    width * width + height * height
}

/// Combined X/Y positional variance of a unit set; 0.0 when empty.
pub(crate) fn total_variance(units: &[UnitSnapshot]) -> f32 {
    if units.is_empty() {
        return 0.0;
    }

    let n = units.len() as f32;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    for unit in units {
        mean_x += unit.position.x;
        mean_y += unit.position.y;
    }
    mean_x /= n;
    mean_y /= n;

    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for unit in units {
        variance_x += (unit.position.x - mean_x).powi(2);
        variance_y += (unit.position.y - mean_y).powi(2);
    }

    variance_x / n + variance_y / n
}

/// Cluster spread normalised against the map's maximum possible variance.
pub(crate) fn normalized_spread(units: &[UnitSnapshot], max_variance: f32) -> f32 {
    if max_variance <= 0.0 {
        return 0.0;
    }
    (total_variance(units) / max_variance).clamp(0.0, 1.0)
}

/// Arithmetic mean of the provided points; `None` when empty.
pub(crate) fn centroid(points: &[WorldPoint]) -> Option<WorldPoint> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f32;
    let mut x = 0.0;
    let mut y = 0.0;
    for point in points {
        x += point.x;
        y += point.y;
    }
    Some(WorldPoint::new(x / n, y / n))
}
