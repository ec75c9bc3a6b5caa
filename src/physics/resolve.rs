//! Impulse-based collision resolution with positional correction.

use vek::Vec2;

use crate::math::Vec2Ext;

use super::{body::Body, collision::Collision, REST_VEL_EPS};

/// Fraction of the penetration corrected per solver iteration.
const PERCENT: f32 = 0.2;

/// Overlap tolerated without correction, suppresses jitter.
const SLOP: f32 = 0.001;

/// Effective masses below this are too degenerate to divide by.
const MIN_EFFECTIVE_MASS: f32 = 1e-8;

/// Resolve a single detected collision between two bodies in the slice.
///
/// Requires `collision.body_a < collision.body_b`, which `detect_all`
/// guarantees.
pub fn resolve(bodies: &mut [Body], collision: &Collision) {
    let (head, tail) = bodies.split_at_mut(collision.body_b);
    let a = &mut head[collision.body_a];
    let b = &mut tail[0];

    resolve_pair(a, b, collision);
}

fn resolve_pair(a: &mut Body, b: &mut Body, collision: &Collision) {
    if a.inv_mass + b.inv_mass == 0.0 {
        // Both static
        return;
    }

    let normal = collision.normal;
    let arm_a = collision.contact - a.position;
    let arm_b = collision.contact - b.position;

    // Velocity of the contact point on each body
    let contact_vel_a = a.velocity + arm_a.perp() * a.angular_velocity;
    let contact_vel_b = b.velocity + arm_b.perp() * b.angular_velocity;
    let normal_vel = (contact_vel_b - contact_vel_a).dot(normal);

    // Separating or resting contacts only get the positional correction
    if normal_vel > -REST_VEL_EPS {
        positional_correction(a, b, normal, collision.penetration);
        return;
    }

    let restitution = a.restitution.min(b.restitution);
    let effective_mass = a.inv_mass
        + b.inv_mass
        + arm_a.perp_dot(normal).powi(2) * a.inv_inertia
        + arm_b.perp_dot(normal).powi(2) * b.inv_inertia;
    if effective_mass < MIN_EFFECTIVE_MASS {
        positional_correction(a, b, normal, collision.penetration);
        return;
    }

    let impulse = normal * (-(1.0 + restitution) * normal_vel / effective_mass);

    a.velocity -= impulse * a.inv_mass;
    b.velocity += impulse * b.inv_mass;
    a.angular_velocity -= arm_a.perp_dot(impulse) * a.inv_inertia;
    b.angular_velocity += arm_b.perp_dot(impulse) * b.inv_inertia;

    positional_correction(a, b, normal, collision.penetration);
}

/// Push overlapping bodies apart, split by inverse mass.
///
/// Bleeds off a fraction of the penetration per iteration while leaving a
/// small tolerance so resting contacts don't oscillate.
fn positional_correction(a: &mut Body, b: &mut Body, normal: Vec2<f32>, penetration: f32) {
    let inv_mass_sum = a.inv_mass + b.inv_mass;
    if inv_mass_sum == 0.0 {
        return;
    }

    let correction = (penetration - SLOP).max(0.0) * PERCENT / inv_mass_sum;
    a.position -= normal * correction * a.inv_mass;
    b.position += normal * correction * b.inv_mass;
}
