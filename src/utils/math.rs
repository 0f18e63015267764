use glam::Vec2;
use std::f32::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

/// Unit directions evenly spaced over a full turn, starting at +x and
/// rotating counter-clockwise.
pub fn ring_directions<const N: usize>() -> [Vec2; N] {
    std::array::from_fn(|i| {
        let radians = deg_to_rad(360.0 / N as f32 * i as f32);
        Vec2::new(radians.cos(), radians.sin())
    })
}

/// Distance along a unit ray to the first point of a circle, or `None` when
/// the circle is behind the origin, missed, or further than `max_distance`.
///
/// Uses the closest-approach projection. When the origin sits inside the
/// circle the near intersection is behind it and the far one is returned.
pub fn ray_circle_intersection(
    origin: Vec2,
    direction: Vec2,
    center: Vec2,
    radius: f32,
    max_distance: f32,
) -> Option<f32> {
    let to_center = center - origin;
    let projection = to_center.dot(direction);
    if projection < 0.0 {
        return None;
    }

    let closest_point = origin + direction * projection;
    let center_distance = closest_point.distance(center);
    if center_distance > radius {
        return None;
    }

    let half_chord = (radius * radius - center_distance * center_distance).sqrt();
    let mut distance = projection - half_chord;
    if distance < 0.0 {
        distance = projection + half_chord;
    }

    (distance > 0.0 && distance <= max_distance).then_some(distance)
}
