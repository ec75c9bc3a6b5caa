use vek::Vec2;

/// Length below which a vector is treated as degenerate.
const NORMALIZE_EPSILON: f32 = 1e-8;

/// Extra 2D vector operations the physics code leans on.
pub trait Vec2Ext {
    /// Perpendicular vector, 90 degrees counter-clockwise.
    fn perp(self) -> Self;

    /// Perpendicular dot product, the scalar z-component of the 3D cross product.
    fn perp_dot(self, other: Self) -> f32;

    /// Unit vector, or the zero vector when the length is degenerate.
    fn normalized_or_zero(self) -> Self;
}

impl Vec2Ext for Vec2<f32> {
    fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    fn perp_dot(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    fn normalized_or_zero(self) -> Self {
        let length = self.magnitude();
        if length < NORMALIZE_EPSILON {
            Self::zero()
        } else {
            self / length
        }
    }
}
