//! Narrow-phase collision detection for circles and oriented rectangles.

pub mod sat;

use itertools::Itertools;
use vek::Vec2;

use super::{
    body::{Body, Shape},
    CollisionBuffer,
};

/// Distance below which two circle centers count as coincident.
const COINCIDENT_EPSILON: f32 = 1e-8;

/// A detected overlap between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Index of the first body.
    pub body_a: usize,
    /// Index of the second body.
    pub body_b: usize,
    /// Unit collision normal, pointing from A toward B.
    pub normal: Vec2<f32>,
    /// Overlap depth, never negative.
    pub penetration: f32,
    /// World-space point on the contact manifold.
    pub contact: Vec2<f32>,
}

/// Detect all pairwise collisions in ascending pair order.
///
/// There is no broad phase; every pair is tested. Detection stops when the
/// buffer is full.
pub fn detect_all(bodies: &[Body], collisions: &mut CollisionBuffer) {
    puffin::profile_function!();

    collisions.clear();

    for (index_a, index_b) in (0..bodies.len()).tuple_combinations() {
        if collisions.is_full() {
            return;
        }

        if let Some(collision) = detect_pair(&bodies[index_a], &bodies[index_b], index_a, index_b)
        {
            collisions.push(collision);
        }
    }
}

/// Test a single pair, dispatching on the shapes.
///
/// Returns `None` when the shapes don't overlap.
pub fn detect_pair(a: &Body, b: &Body, index_a: usize, index_b: usize) -> Option<Collision> {
    let (normal, penetration, contact) = match (a.shape, b.shape) {
        (Shape::Circle { .. }, Shape::Circle { .. }) => circle_circle(a, b)?,
        (Shape::Circle { radius }, Shape::Rect { .. }) => circle_rect(a.position, radius, b)?,
        (Shape::Rect { .. }, Shape::Circle { radius }) => {
            // Test as circle-rect and flip the normal so it still points A to B
            let (normal, penetration, contact) = circle_rect(b.position, radius, a)?;
            (-normal, penetration, contact)
        }
        (Shape::Rect { .. }, Shape::Rect { .. }) => sat::rect_rect(a, b)?,
    };

    Some(Collision {
        body_a: index_a,
        body_b: index_b,
        normal,
        penetration,
        contact,
    })
}

/// Circle versus circle.
fn circle_circle(a: &Body, b: &Body) -> Option<(Vec2<f32>, f32, Vec2<f32>)> {
    let delta = b.position - a.position;
    let radius_sum = a.radius() + b.radius();

    let dist_sq = delta.magnitude_squared();
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < COINCIDENT_EPSILON {
        // Coincident centers, pick an arbitrary axis
        return Some((Vec2::new(1.0, 0.0), radius_sum, a.position));
    }

    let normal = delta / dist;
    let penetration = radius_sum - dist;
    // Contact point on the surface of A, offset toward B
    let contact = a.position + normal * (a.radius() - penetration * 0.5);

    Some((normal, penetration, contact))
}

/// Circle versus oriented rectangle, with the circle as body A.
///
/// Works in the rectangle's local frame: clamp the circle center to the half
/// extents to find the closest point, or walk out through the nearest edge
/// when the center sits inside the rectangle.
fn circle_rect(
    circle_pos: Vec2<f32>,
    radius: f32,
    rect: &Body,
) -> Option<(Vec2<f32>, f32, Vec2<f32>)> {
    let Shape::Rect { width, height } = rect.shape else {
        return None;
    };
    let half = Vec2::new(width * 0.5, height * 0.5);

    let local = (circle_pos - rect.position).rotated_z(-rect.angle);
    let inside = local.x.abs() <= half.x && local.y.abs() <= half.y;

    let (local_normal, penetration, local_contact) = if inside {
        // Center inside the rectangle: resolve through the nearest edge. The
        // normal keeps pointing from the circle toward the rectangle so that
        // resolution pushes the circle out.
        let mut distance = local.x + half.x;
        let mut normal = Vec2::new(1.0, 0.0);
        let mut contact = Vec2::new(-half.x, local.y);

        if half.x - local.x < distance {
            distance = half.x - local.x;
            normal = Vec2::new(-1.0, 0.0);
            contact = Vec2::new(half.x, local.y);
        }
        if local.y + half.y < distance {
            distance = local.y + half.y;
            normal = Vec2::new(0.0, 1.0);
            contact = Vec2::new(local.x, -half.y);
        }
        if half.y - local.y < distance {
            distance = half.y - local.y;
            normal = Vec2::new(0.0, -1.0);
            contact = Vec2::new(local.x, half.y);
        }

        (normal, distance + radius, contact)
    } else {
        let closest = Vec2::new(
            local.x.clamp(-half.x, half.x),
            local.y.clamp(-half.y, half.y),
        );
        let delta = local - closest;

        let dist_sq = delta.magnitude_squared();
        if dist_sq >= radius * radius {
            return None;
        }

        let dist = dist_sq.sqrt();
        if dist < COINCIDENT_EPSILON {
            (Vec2::new(1.0, 0.0), radius, closest)
        } else {
            // Normal points from the circle toward the rectangle
            (-delta / dist, radius - dist, closest)
        }
    };

    let normal = local_normal.rotated_z(rect.angle);
    let contact = rect.position + local_contact.rotated_z(rect.angle);

    Some((normal, penetration, contact))
}
