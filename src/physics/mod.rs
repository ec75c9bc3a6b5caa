//! Deterministic impulse-based physics engine.
//!
//! The world owns a fixed-capacity body array and a per-world random number
//! generator; stepping is a pure function of that state, so identical seeds
//! and inputs replay bit-identically.

pub mod body;
pub mod collision;
pub mod resolve;

use arrayvec::ArrayVec;
use vek::Vec2;

use crate::{math::Vec2Ext, random::Xorshift32};

use self::{
    body::{Body, Shape},
    collision::Collision,
};

/// Maximum amount of bodies in a world.
pub const MAX_BODIES: usize = 256;

/// Maximum amount of collisions resolved per solver iteration.
pub const MAX_COLLISIONS: usize = 512;

/// How often collisions are re-detected and re-resolved within a step.
pub const SOLVER_ITERATIONS: usize = 6;

/// Contact speed in pixels/sec below which a contact counts as resting.
pub const REST_VEL_EPS: f32 = 5.0;

/// Fixed-capacity collision buffer filled by detection.
pub type CollisionBuffer = ArrayVec<Collision, MAX_COLLISIONS>;

/// Axis-aligned world boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Display-only toggles, no effect on the simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugFlags {
    /// Draw velocity vectors.
    pub show_velocity: bool,
    /// Draw contact points.
    pub show_contacts: bool,
}

/// Physics world with inline body storage.
#[derive(Debug, Clone)]
pub struct World {
    /// All bodies, iterated in insertion order.
    bodies: ArrayVec<Body, MAX_BODIES>,
    /// Gravity in pixels/sec^2.
    pub gravity: Vec2<f32>,
    /// Fixed integration timestep in seconds.
    pub dt: f32,
    /// Optional world boundary.
    bounds: Option<Bounds>,
    /// Index of the actuator-driven beam body, if any.
    pub actuator_body: Option<usize>,
    /// Rest position of the beam when there is no fulcrum to ride on.
    pub actuator_pivot: Vec2<f32>,
    /// Display toggles.
    pub debug: DebugFlags,
    /// Deterministic per-world randomness.
    rng: Xorshift32,
    /// Collisions from the last solver iteration, kept for display.
    contacts: CollisionBuffer,
}

impl World {
    /// Construct an empty world.
    pub fn new(gravity: Vec2<f32>, dt: f32) -> Self {
        let bodies = ArrayVec::new();
        let bounds = None;
        let actuator_body = None;
        let actuator_pivot = Vec2::zero();
        let debug = DebugFlags::default();
        let rng = Xorshift32::new(0);
        let contacts = ArrayVec::new();

        Self {
            bodies,
            gravity,
            dt,
            bounds,
            actuator_body,
            actuator_pivot,
            debug,
            rng,
            contacts,
        }
    }

    /// Set the world boundary.
    pub fn set_bounds(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.bounds = Some(Bounds {
            left,
            top,
            right,
            bottom,
        });
    }

    /// The world boundary, if enabled.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Add a body, returning its index.
    ///
    /// Returns `None` when the world is full.
    pub fn add_body(&mut self, body: Body) -> Option<usize> {
        if self.bodies.is_full() {
            return None;
        }

        self.bodies.push(body);

        Some(self.bodies.len() - 1)
    }

    /// Body at an index.
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Mutable body at an index.
    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// All bodies in insertion order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Collisions detected in the last solver iteration of the last step.
    pub fn contacts(&self) -> &[Collision] {
        &self.contacts
    }

    /// Re-seed the world's random number generator.
    pub fn seed(&mut self, seed: u32) {
        self.rng = Xorshift32::new(seed);
    }

    /// Next random value in `[0, 1)` from the world's generator.
    pub fn randf(&mut self) -> f32 {
        self.rng.next_f32()
    }

    /// Advance the simulation by one fixed timestep.
    pub fn step(&mut self) {
        puffin::profile_function!();

        self.integrate();

        // Re-detecting every iteration handles cascading contacts
        for _ in 0..SOLVER_ITERATIONS {
            collision::detect_all(&self.bodies, &mut self.contacts);

            for index in 0..self.contacts.len() {
                let collision = self.contacts[index];
                resolve::resolve(&mut self.bodies, &collision);
            }

            // Boundaries last, so bodies end the iteration inside the world
            self.resolve_boundaries();
        }
    }

    /// Semi-implicit Euler: velocity first, then position.
    fn integrate(&mut self) {
        let (gravity, dt) = (self.gravity, self.dt);

        for body in &mut self.bodies {
            if body.is_static() {
                continue;
            }

            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
            body.angle += body.angular_velocity * dt;
        }
    }

    /// Keep all dynamic bodies inside the boundary.
    fn resolve_boundaries(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };

        for body in &mut self.bodies {
            if body.is_static() {
                continue;
            }

            match body.shape {
                Shape::Circle { radius } => Self::circle_boundary(body, radius, bounds),
                Shape::Rect { .. } => Self::rect_boundary(body, bounds),
            }
        }
    }

    /// Snap a circle back inside the walls, reflecting the normal velocity.
    ///
    /// Velocities below the resting threshold are zeroed instead of
    /// reflected, which kills bounce jitter.
    fn circle_boundary(body: &mut Body, radius: f32, bounds: Bounds) {
        if body.position.x - radius < bounds.left {
            body.position.x = bounds.left + radius;
            body.velocity.x = Self::reflect(body.velocity.x, body.restitution);
        }
        if body.position.x + radius > bounds.right {
            body.position.x = bounds.right - radius;
            body.velocity.x = Self::reflect(body.velocity.x, body.restitution);
        }
        if body.position.y - radius < bounds.top {
            body.position.y = bounds.top + radius;
            body.velocity.y = Self::reflect(body.velocity.y, body.restitution);
        }
        if body.position.y + radius > bounds.bottom {
            body.position.y = bounds.bottom - radius;
            body.velocity.y = Self::reflect(body.velocity.y, body.restitution);
        }
    }

    fn reflect(velocity: f32, restitution: f32) -> f32 {
        if velocity.abs() < REST_VEL_EPS {
            0.0
        } else {
            -velocity * restitution
        }
    }

    /// Resolve the single deepest corner of a rectangle against the walls.
    ///
    /// Stacked corner contacts converge over the solver iterations.
    fn rect_boundary(body: &mut Body, bounds: Bounds) {
        let Some(corners) = body.corners() else {
            return;
        };

        // Find the corner-wall pair with the deepest penetration
        let mut worst: Option<(Vec2<f32>, f32, Vec2<f32>)> = None;
        for corner in corners {
            let walls = [
                (Vec2::new(1.0, 0.0), bounds.left - corner.x),
                (Vec2::new(-1.0, 0.0), corner.x - bounds.right),
                (Vec2::new(0.0, 1.0), bounds.top - corner.y),
                (Vec2::new(0.0, -1.0), corner.y - bounds.bottom),
            ];

            for (normal, penetration) in walls {
                if penetration > 0.0
                    && worst.map_or(true, |(_, deepest, _)| penetration > deepest)
                {
                    worst = Some((normal, penetration, corner));
                }
            }
        }
        let Some((normal, penetration, corner)) = worst else {
            return;
        };

        // The corner translates along with the body, so the arm is unchanged
        let arm = corner - body.position;
        body.position += normal * penetration;

        let contact_vel = body.velocity + arm.perp() * body.angular_velocity;
        let normal_vel = contact_vel.dot(normal);
        if normal_vel >= -REST_VEL_EPS {
            return;
        }

        let effective_mass = body.inv_mass + arm.perp_dot(normal).powi(2) * body.inv_inertia;
        if effective_mass < 1e-8 {
            return;
        }

        let impulse = normal * (-(1.0 + body.restitution) * normal_vel / effective_mass);
        body.velocity += impulse * body.inv_mass;
        body.angular_velocity += arm.perp_dot(impulse) * body.inv_inertia;
    }
}

#[cfg(test)]
mod tests {
    use vek::Vec2;

    use crate::physics::collision::detect_pair;

    use super::{body::Body, World, MAX_BODIES};

    /// Bitwise equality over every body field.
    fn assert_worlds_identical(a: &World, b: &World) {
        assert_eq!(a.bodies().len(), b.bodies().len());
        for (body_a, body_b) in a.bodies().iter().zip(b.bodies()) {
            assert_eq!(body_a.position.x.to_bits(), body_b.position.x.to_bits());
            assert_eq!(body_a.position.y.to_bits(), body_b.position.y.to_bits());
            assert_eq!(body_a.velocity.x.to_bits(), body_b.velocity.x.to_bits());
            assert_eq!(body_a.velocity.y.to_bits(), body_b.velocity.y.to_bits());
            assert_eq!(body_a.angle.to_bits(), body_b.angle.to_bits());
            assert_eq!(
                body_a.angular_velocity.to_bits(),
                body_b.angular_velocity.to_bits()
            );
        }
    }

    fn mixed_world() -> World {
        let mut world = World::new(Vec2::new(0.0, 98.1), 1.0 / 240.0);
        world.set_bounds(0.0, 0.0, 600.0, 600.0);

        let mut floor = Body::rect(Vec2::new(300.0, 500.0), 400.0, 40.0, 1.0, 0.8);
        floor.make_static();
        world.add_body(floor).unwrap();

        world
            .add_body(Body::circle(Vec2::new(300.0, 100.0), 30.0, 1.0, 0.8))
            .unwrap();
        let mut mover = Body::circle(Vec2::new(150.0, 150.0), 25.0, 1.0, 0.8);
        mover.velocity = Vec2::new(50.0, 0.0);
        world.add_body(mover).unwrap();

        let mut plank = Body::rect(Vec2::new(300.0, 300.0), 100.0, 60.0, 1.0, 0.8);
        plank.angle = 0.5;
        world.add_body(plank).unwrap();

        world
    }

    #[test]
    fn test_free_fall_momentum() {
        let mut world = World::new(Vec2::new(0.0, 98.1), 1.0 / 240.0);
        world
            .add_body(Body::circle(Vec2::new(100.0, 100.0), 10.0, 1.0, 0.8))
            .unwrap();

        let increment = 98.1f32 * (1.0 / 240.0);

        // The very first increment is exact
        world.step();
        let mut previous = world.body(0).unwrap().velocity.y;
        assert_eq!(previous.to_bits(), increment.to_bits());

        // Later increments only lose the rounding of the running sum
        for _ in 0..99 {
            world.step();
            let velocity = world.body(0).unwrap().velocity.y;
            let tolerance = f32::EPSILON * velocity.abs().max(1.0);
            assert!((velocity - previous - increment).abs() <= tolerance);
            previous = velocity;
        }
    }

    #[test]
    fn test_static_immutable() {
        let mut world = mixed_world();
        let before = *world.body(0).unwrap();

        for _ in 0..500 {
            world.step();
        }

        let after = *world.body(0).unwrap();
        assert_eq!(before.position, after.position);
        assert_eq!(before.velocity, after.velocity);
        assert_eq!(before.angle, after.angle);
    }

    #[test]
    fn test_determinism() {
        let mut a = mixed_world();
        let mut b = mixed_world();

        for _ in 0..1000 {
            a.step();
            b.step();
            assert_worlds_identical(&a, &b);
        }
    }

    #[test]
    fn test_capacity() {
        let mut world = World::new(Vec2::zero(), 1.0 / 240.0);
        for index in 0..MAX_BODIES {
            assert_eq!(
                world.add_body(Body::circle(Vec2::zero(), 1.0, 1.0, 0.5)),
                Some(index)
            );
        }

        assert_eq!(world.add_body(Body::circle(Vec2::zero(), 1.0, 1.0, 0.5)), None);
        assert!(world.body(MAX_BODIES).is_none());
        assert!(world.body(0).is_some());
    }

    #[test]
    fn test_boundary_containment() {
        let mut world = World::new(Vec2::new(0.0, 300.0), 1.0 / 240.0);
        world.set_bounds(0.0, 0.0, 600.0, 600.0);

        let mut ball = Body::circle(Vec2::new(300.0, 300.0), 20.0, 1.0, 0.9);
        ball.velocity = Vec2::new(-400.0, 0.0);
        world.add_body(ball).unwrap();

        for _ in 0..2000 {
            world.step();
            let position = world.body(0).unwrap().position;
            assert!(position.x - 20.0 >= -1e-3);
            assert!(position.x + 20.0 <= 600.0 + 1e-3);
            assert!(position.y + 20.0 <= 600.0 + 1e-3);
        }
    }

    #[test]
    fn test_boundary_jitter_kill() {
        let mut world = World::new(Vec2::zero(), 1.0 / 240.0);
        world.set_bounds(0.0, 0.0, 600.0, 600.0);

        // Drifting into the wall slower than the resting threshold
        let mut ball = Body::circle(Vec2::new(21.0, 300.0), 20.0, 1.0, 1.0);
        ball.velocity = Vec2::new(-3.0, 0.0);
        world.add_body(ball).unwrap();

        for _ in 0..200 {
            world.step();
        }

        let ball = world.body(0).unwrap();
        assert_eq!(ball.velocity.x, 0.0);
        assert!((ball.position.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_separation_decreases() {
        let mut world = World::new(Vec2::zero(), 1.0 / 240.0);
        world
            .add_body(Body::circle(Vec2::new(100.0, 100.0), 10.0, 1.0, 0.2))
            .unwrap();
        world
            .add_body(Body::circle(Vec2::new(112.0, 100.0), 10.0, 1.0, 0.2))
            .unwrap();

        let penetration = |world: &World| {
            detect_pair(world.body(0).unwrap(), world.body(1).unwrap(), 0, 1)
                .map_or(0.0, |collision| collision.penetration)
        };

        let before = penetration(&world);
        assert!(before > 0.0);
        world.step();
        assert!(penetration(&world) <= before);
    }

    #[test]
    fn test_elastic_pair_through_world() {
        // Two circles flying at each other head-on swap velocities
        let mut world = World::new(Vec2::zero(), 1.0 / 240.0);

        let mut a = Body::circle(Vec2::new(100.0, 300.0), 10.0, 1.0, 1.0);
        a.velocity = Vec2::new(50.0, 0.0);
        world.add_body(a).unwrap();
        let mut b = Body::circle(Vec2::new(200.0, 300.0), 10.0, 1.0, 1.0);
        b.velocity = Vec2::new(-50.0, 0.0);
        world.add_body(b).unwrap();

        for _ in 0..400 {
            world.step();
        }

        let (a, b) = (world.body(0).unwrap(), world.body(1).unwrap());
        assert!((a.velocity.x + 50.0).abs() < 1e-4);
        assert!((b.velocity.x - 50.0).abs() < 1e-4);
    }
}
