use vek::Vec2;

/// Collision shape of a body, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Solid circle.
    Circle {
        /// Radius in pixels.
        radius: f32,
    },
    /// Solid rectangle, oriented by the body angle.
    Rect {
        /// Full width in pixels.
        width: f32,
        /// Full height in pixels.
        height: f32,
    },
}

impl Shape {
    /// Moment of inertia around the center of mass for a given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        match *self {
            // https://en.wikipedia.org/wiki/List_of_moments_of_inertia
            Self::Circle { radius } => 0.5 * mass * radius * radius,
            Self::Rect { width, height } => mass * (width.powi(2) + height.powi(2)) / 12.0,
        }
    }
}

/// A rigid body living inside a world.
///
/// Plain state, mutated in place by the integrator and the solver. A static
/// body is encoded by zero inverse mass and zero inverse inertia; the solver
/// never moves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Center of mass in world pixel coordinates.
    pub position: Vec2<f32>,
    /// Linear velocity in pixels/sec.
    pub velocity: Vec2<f32>,
    /// Orientation in radians, zero pointing along world +x.
    pub angle: f32,
    /// Angular velocity in rad/sec.
    pub angular_velocity: f32,
    /// Collision shape.
    pub shape: Shape,
    /// Mass, zero for static bodies.
    pub mass: f32,
    /// Inverse mass, zero for static bodies.
    pub inv_mass: f32,
    /// Moment of inertia around the center of mass.
    pub inertia: f32,
    /// Inverse moment of inertia, zero for static bodies.
    pub inv_inertia: f32,
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
    /// RGBA display color, ignored by the physics.
    pub color: [u8; 4],
}

impl Body {
    /// Construct a dynamic circle.
    pub fn circle(position: Vec2<f32>, radius: f32, mass: f32, restitution: f32) -> Self {
        Self::new(position, Shape::Circle { radius }, mass, restitution)
    }

    /// Construct a dynamic rectangle.
    pub fn rect(position: Vec2<f32>, width: f32, height: f32, mass: f32, restitution: f32) -> Self {
        Self::new(position, Shape::Rect { width, height }, mass, restitution)
    }

    /// Construct a dynamic body from a shape.
    pub fn new(position: Vec2<f32>, shape: Shape, mass: f32, restitution: f32) -> Self {
        let velocity = Vec2::zero();
        let angle = 0.0;
        let angular_velocity = 0.0;
        let inv_mass = if mass > 0.0 { mass.recip() } else { 0.0 };
        let inertia = shape.inertia(mass);
        let inv_inertia = if inv_mass > 0.0 && inertia > 0.0 {
            inertia.recip()
        } else {
            0.0
        };
        let restitution = restitution.clamp(0.0, 1.0);
        let color = [255, 255, 255, 255];

        Self {
            position,
            velocity,
            angle,
            angular_velocity,
            shape,
            mass,
            inv_mass,
            inertia,
            inv_inertia,
            restitution,
            color,
        }
    }

    /// Turn the body immovable.
    pub fn make_static(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inv_inertia = 0.0;
    }

    /// Whether the body is immovable.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Circle radius, zero for rectangles.
    pub fn radius(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Rect { .. } => 0.0,
        }
    }

    /// The 4 world-space corners of a rectangle body.
    ///
    /// Returns `None` for circles.
    pub fn corners(&self) -> Option<[Vec2<f32>; 4]> {
        let Shape::Rect { width, height } = self.shape else {
            return None;
        };

        let (sin, cos) = self.angle.sin_cos();
        let w_cos = width * 0.5 * cos;
        let w_sin = width * 0.5 * sin;
        let h_cos = height * 0.5 * cos;
        let h_sin = height * 0.5 * sin;

        Some([
            self.position + Vec2::new(-w_cos + h_sin, -w_sin - h_cos),
            self.position + Vec2::new(w_cos + h_sin, w_sin - h_cos),
            self.position + Vec2::new(w_cos - h_sin, w_sin + h_cos),
            self.position + Vec2::new(-w_cos - h_sin, -w_sin + h_cos),
        ])
    }
}
