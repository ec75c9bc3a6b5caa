//! Separating axis theorem for oriented rectangles.

use arrayvec::ArrayVec;
use vek::Vec2;

use crate::physics::body::Body;

/// Corners projecting this close to the extreme still count as support
/// points, which captures edge-edge contacts.
const SUPPORT_EPSILON: f32 = 1e-4;

/// A polygon projected on an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Minimum projected value.
    pub min: f32,
    /// Maximum projected value.
    pub max: f32,
}

impl Projection {
    /// Project a set of vertices on an axis.
    pub fn project<const SIZE: usize>(vertices: [Vec2<f32>; SIZE], axis: Vec2<f32>) -> Self {
        // Start with the first vertex so we don't have to check for infinites
        let mut min = axis.dot(vertices[0]);
        let mut max = min;

        for vertex in vertices.into_iter().skip(1) {
            let projected = axis.dot(vertex);
            min = min.min(projected);
            max = max.max(projected);
        }

        Self { min, max }
    }

    /// Check if this is fully separated from another projection.
    pub fn separated(&self, other: Self) -> bool {
        other.max < self.min || self.max < other.min
    }

    /// Calculate the overlap with another projection.
    pub fn overlap(&self, other: Self) -> f32 {
        (self.max.min(other.max) - self.min.max(other.min)).max(0.0)
    }
}

/// Oriented rectangle versus oriented rectangle.
///
/// Tests the four face axes of both rectangles; the axis with minimum overlap
/// becomes the collision normal, flipped if needed so it points from A toward
/// B. The contact point is the average of both bodies' support corners along
/// the normal.
pub fn rect_rect(a: &Body, b: &Body) -> Option<(Vec2<f32>, f32, Vec2<f32>)> {
    let (a_corners, b_corners) = (a.corners()?, b.corners()?);

    let (sin_a, cos_a) = a.angle.sin_cos();
    let (sin_b, cos_b) = b.angle.sin_cos();
    let axes = [
        Vec2::new(cos_a, sin_a),
        Vec2::new(-sin_a, cos_a),
        Vec2::new(cos_b, sin_b),
        Vec2::new(-sin_b, cos_b),
    ];

    let mut penetration = f32::INFINITY;
    let mut best_axis = axes[0];
    for axis in axes {
        let a_projected = Projection::project(a_corners, axis);
        let b_projected = Projection::project(b_corners, axis);

        if a_projected.separated(b_projected) {
            return None;
        }

        let overlap = a_projected.overlap(b_projected);
        if overlap < penetration {
            penetration = overlap;
            best_axis = axis;
        }
    }

    // Point the normal from A toward B
    let normal = if best_axis.dot(b.position - a.position) < 0.0 {
        -best_axis
    } else {
        best_axis
    };

    // Average the deepest corners of both bodies, one or two per side
    let mut sum = Vec2::zero();
    let mut count = 0.0;
    for corner in support_points(a_corners, normal)
        .into_iter()
        .chain(support_points(b_corners, -normal))
    {
        sum += corner;
        count += 1.0;
    }
    let contact = sum / count;

    Some((normal, penetration, contact))
}

/// The corners of a rectangle furthest along a direction.
fn support_points(corners: [Vec2<f32>; 4], direction: Vec2<f32>) -> ArrayVec<Vec2<f32>, 2> {
    let mut extreme = f32::NEG_INFINITY;
    for corner in corners {
        extreme = extreme.max(direction.dot(corner));
    }

    corners
        .into_iter()
        .filter(|corner| direction.dot(*corner) >= extreme - SUPPORT_EPSILON)
        .take(2)
        .collect()
}
