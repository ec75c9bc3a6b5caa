//! First-order beam actuator.
//!
//! Turns a normalized motor command into a beam pose. The beam itself is
//! kinematic: the simulator writes the pose onto the beam body around every
//! physics step, the solver never integrates it.

/// Maximum angular velocity of the beam in rad/sec.
pub const MAX_BEAM_SPEED: f32 = 2.0;

/// Time constant of the first-order lag in seconds.
///
/// Small values mean a snappy motor, large values a sluggish one.
pub const TAU: f32 = 0.1;

/// Beam angle saturation limit in radians.
pub const BEAM_ANGLE_MAX: f32 = 0.5;

/// Actuator state, in the same units as the beam body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actuator {
    /// Current beam angle in radians.
    pub angle: f32,
    /// Current angular velocity in rad/sec.
    pub angular_velocity: f32,
}

impl Actuator {
    /// Construct at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the rest state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the actuator by one timestep with a command in `[-1, 1]`.
    ///
    /// The angular velocity lags exponentially behind the commanded target,
    /// the angle integrates the velocity and saturates at the limit, killing
    /// the velocity when it hits.
    pub fn update(&mut self, action: f32, dt: f32) {
        let action = action.clamp(-1.0, 1.0);
        let target_velocity = action * MAX_BEAM_SPEED;

        self.angular_velocity += (dt / TAU) * (target_velocity - self.angular_velocity);
        self.angle += self.angular_velocity * dt;

        if self.angle > BEAM_ANGLE_MAX {
            self.angle = BEAM_ANGLE_MAX;
            self.angular_velocity = 0.0;
        }
        if self.angle < -BEAM_ANGLE_MAX {
            self.angle = -BEAM_ANGLE_MAX;
            self.angular_velocity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Actuator, BEAM_ANGLE_MAX, MAX_BEAM_SPEED};

    const DT: f32 = 1.0 / 240.0;

    #[test]
    fn test_velocity_approaches_target() {
        let mut actuator = Actuator::new();

        // One full time constant gets within 1/e of the target
        for _ in 0..24 {
            actuator.update(1.0, DT);
        }
        assert!(actuator.angular_velocity > MAX_BEAM_SPEED * 0.6);
        assert!(actuator.angular_velocity < MAX_BEAM_SPEED);

        // A small command converges onto its target before the angle
        // saturates
        let mut slow = Actuator::new();
        for _ in 0..240 {
            slow.update(0.1, DT);
        }
        assert!(slow.angle < BEAM_ANGLE_MAX);
        assert_relative_eq!(
            slow.angular_velocity,
            0.1 * MAX_BEAM_SPEED,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_saturation() {
        let mut actuator = Actuator::new();

        for _ in 0..2400 {
            actuator.update(1.0, DT);
            assert!(actuator.angle.abs() <= BEAM_ANGLE_MAX);
            if actuator.angle.abs() == BEAM_ANGLE_MAX {
                assert_eq!(actuator.angular_velocity, 0.0);
            }
        }

        // Far more than enough time to hit the limit
        assert_eq!(actuator.angle, BEAM_ANGLE_MAX);
        assert_eq!(actuator.angular_velocity, 0.0);
    }

    #[test]
    fn test_action_clamped() {
        let mut strong = Actuator::new();
        let mut unit = Actuator::new();

        for _ in 0..120 {
            strong.update(100.0, DT);
            unit.update(1.0, DT);
        }

        assert_eq!(strong, unit);
    }

    #[test]
    fn test_reset() {
        let mut actuator = Actuator::new();
        for _ in 0..100 {
            actuator.update(-1.0, DT);
        }

        actuator.reset();
        assert_eq!(actuator, Actuator::new());
    }
}
