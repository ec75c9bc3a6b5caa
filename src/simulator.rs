//! Simulator tying the actuator to the physics world.
//!
//! Owns the world, the parsed scene it was built from and the actuator
//! state. The beam body is fully kinematic: its pose is written from the
//! actuator before and after every physics step, bracketing the solver so
//! contacts can't perturb it.

use miette::Result;
use vek::Vec2;

use crate::{
    actuator::Actuator,
    physics::{body::Shape, World},
    scene::Scene,
};

/// Size of the observation vector.
pub const OBS_DIM: usize = 4;

/// Fixed physics timestep of the simulation, 240 Hz.
pub const SIM_DT: f32 = 1.0 / 240.0;

/// Index of the ball body, by convention the second scene entry.
pub const BALL_BODY_INDEX: usize = 1;

/// Initial beam angle randomization range in radians, ±20 degrees.
///
/// Large enough to force immediate corrective control while keeping every
/// start recoverable.
const RANDOM_ANGLE_RAD: f32 = 0.349;

/// Initial ball offset randomization, as a ratio of the beam half-length.
const RANDOM_POSITION_RATIO: f32 = 0.2;

/// Deterministic ball-on-beam simulator.
pub struct Simulator {
    /// Physics state.
    world: World,
    /// Scene description the world is rebuilt from on reset.
    scene: Scene,
    /// RNG seed applied on every reset.
    seed: u32,
    /// Fixed timestep, overrides whatever the scene set.
    dt: f32,
    /// Beam actuator state.
    actuator: Actuator,
}

impl Simulator {
    /// Construct from an already parsed scene.
    pub fn new(scene: Scene, seed: u32, dt: f32) -> Self {
        let mut world = scene.instantiate();
        world.dt = dt;
        world.seed(seed);
        let actuator = Actuator::new();

        Self {
            world,
            scene,
            seed,
            dt,
            actuator,
        }
    }

    /// Construct by loading a scene file.
    pub fn from_path(scene_path: &str, seed: u32, dt: f32) -> Result<Self> {
        let scene = Scene::load(scene_path)?;

        Ok(Self::new(scene, seed, dt))
    }

    /// Reset to a randomized initial state.
    ///
    /// Rebuilds the world from the scene, re-seeds the RNG and applies the
    /// initial-state randomization: beam angle uniform in ±20 degrees, ball
    /// shifted along the beam by up to ±20% of the half-length, velocities
    /// zeroed. The RNG draw order is part of the deterministic contract.
    pub fn reset(&mut self) {
        // Display toggles survive the rebuild, they are not scene state
        let debug = self.world.debug;
        self.world = self.scene.instantiate();
        self.world.dt = self.dt;
        self.world.seed(self.seed);
        self.world.debug = debug;
        self.actuator.reset();

        log::debug!(
            "reset: seed={} actuator_body={:?}",
            self.seed,
            self.world.actuator_body
        );

        // Randomization only applies to a well-formed scene
        let Some(beam_index) = self.world.actuator_body else {
            return;
        };
        let Some(Shape::Rect {
            width: beam_width, ..
        }) = self.world.body(beam_index).map(|beam| beam.shape)
        else {
            return;
        };
        if self.world.body(BALL_BODY_INDEX).is_none() {
            return;
        }

        let angle_sample = self.world.randf() * 2.0 - 1.0;
        self.actuator.angle = angle_sample * RANDOM_ANGLE_RAD;
        self.impose_beam_pose();

        let position_sample = self.world.randf() * 2.0 - 1.0;
        let offset = position_sample * RANDOM_POSITION_RATIO * beam_width * 0.5;
        if let Some(ball) = self.world.body_mut(BALL_BODY_INDEX) {
            // Shift relative to the scene position, the height stays
            ball.position.x += offset;
            ball.velocity = Vec2::zero();
            ball.angular_velocity = 0.0;
        }
    }

    /// Advance the simulation by one timestep with a command in `[-1, 1]`.
    pub fn step(&mut self, action: f32) {
        self.actuator.update(action, self.dt);

        // Bracket the physics step so solver contacts can't move the beam
        self.impose_beam_pose();
        self.world.step();
        self.impose_beam_pose();
    }

    /// Write the actuator pose onto the beam body.
    ///
    /// When body 0 is a different rectangle the beam rides on top of it as a
    /// fulcrum, otherwise it sits at the scene's actuator pivot.
    fn impose_beam_pose(&mut self) {
        let Some(beam_index) = self.world.actuator_body else {
            return;
        };
        let Some(Shape::Rect {
            height: beam_height,
            ..
        }) = self.world.body(beam_index).map(|beam| beam.shape)
        else {
            return;
        };

        let base = if beam_index != 0 {
            self.world.body(0)
        } else {
            None
        };
        let position = match base {
            Some(base) => match base.shape {
                Shape::Rect {
                    height: base_height,
                    ..
                } => Vec2::new(
                    base.position.x,
                    base.position.y - base_height * 0.5 - beam_height * 0.5,
                ),
                Shape::Circle { .. } => self.world.actuator_pivot,
            },
            None => self.world.actuator_pivot,
        };

        let angle = self.actuator.angle;
        if let Some(beam) = self.world.body_mut(beam_index) {
            beam.position = position;
            beam.angle = angle;
            beam.velocity = Vec2::zero();
            beam.angular_velocity = 0.0;
        }
    }

    /// Extract the observation vector.
    ///
    /// `[beam angle, beam angular velocity, ball position along the beam,
    /// ball velocity along the beam]`, the last two projected onto the
    /// beam's local x-axis. Zeroed when the beam or ball is missing.
    pub fn observe(&self) -> [f32; OBS_DIM] {
        let Some(beam) = self
            .world
            .actuator_body
            .and_then(|index| self.world.body(index))
        else {
            return [0.0; OBS_DIM];
        };
        let Some(ball) = self.world.body(BALL_BODY_INDEX) else {
            return [0.0; OBS_DIM];
        };

        let (sin, cos) = self.actuator.angle.sin_cos();
        let delta = ball.position - beam.position;

        // Beam local x-axis in world coordinates is [cos, sin]
        let x_along_beam = delta.x * cos + delta.y * sin;
        let vel_along_beam = ball.velocity.x * cos + ball.velocity.y * sin;

        [
            self.actuator.angle,
            self.actuator.angular_velocity,
            x_along_beam,
            vel_along_beam,
        ]
    }

    /// The physics world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the physics world, e.g. for display toggles.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The actuator state.
    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// Seed applied on the next reset.
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// The fixed timestep.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use vek::Vec2;

    use crate::scene::Scene;

    use super::{Simulator, RANDOM_ANGLE_RAD, SIM_DT};

    fn fulcrum(seed: u32) -> Simulator {
        let scene = Scene::parse(include_str!("../assets/fulcrum.toml")).unwrap();

        Simulator::new(scene, seed, SIM_DT)
    }

    #[test]
    fn test_pose_imposition() {
        let mut sim = fulcrum(12345);
        sim.reset();
        sim.step(0.0);

        // The beam rides on top of the fulcrum column
        let base = *sim.world().body(0).unwrap();
        let beam = *sim.world().body(2).unwrap();
        assert_relative_eq!(beam.position.x, base.position.x);
        assert_relative_eq!(beam.position.y, base.position.y - 100.0 - 10.0);
        assert_eq!(beam.velocity, Vec2::zero());
        assert_eq!(beam.angular_velocity, 0.0);
        assert_eq!(beam.angle, sim.actuator().angle);
    }

    #[test]
    fn test_reset_randomization() {
        let mut sim = fulcrum(12345);

        let scene_x = sim.world().body(1).unwrap().position.x;
        sim.reset();

        let actuator = *sim.actuator();
        assert!(actuator.angle.abs() <= RANDOM_ANGLE_RAD);

        let ball = *sim.world().body(1).unwrap();
        // Offset stays within ±20% of the beam half-length
        assert!((ball.position.x - scene_x).abs() <= 0.2 * 300.0);
        assert_eq!(ball.velocity, Vec2::zero());
        assert_eq!(ball.angular_velocity, 0.0);

        // Same seed resets to the same state
        let mut other = fulcrum(12345);
        other.reset();
        assert_eq!(
            other.actuator().angle.to_bits(),
            actuator.angle.to_bits()
        );
        assert_eq!(
            other.world().body(1).unwrap().position.x.to_bits(),
            ball.position.x.to_bits()
        );

        // A different seed lands elsewhere
        let mut different = fulcrum(99);
        different.reset();
        assert_ne!(
            different.actuator().angle.to_bits(),
            actuator.angle.to_bits()
        );
    }

    #[test]
    fn test_observation_projection() {
        // With the beam level, the projection is the plain x difference
        let scene = Scene::parse(
            r#"
            [[bodies]]
            type = "rect"
            position = [100.0, 200.0]
            width = 40.0
            height = 200.0
            static = true

            [[bodies]]
            type = "circle"
            position = [140.0, 80.0]
            radius = 10.0
            velocity = [25.0, -4.0]

            [[bodies]]
            type = "rect"
            position = [100.0, 90.0]
            width = 200.0
            height = 20.0
            static = true
            actuator = true
            "#,
        )
        .unwrap();
        let sim = Simulator::new(scene, 1, SIM_DT);

        let observation = sim.observe();
        assert_eq!(observation[0], 0.0);
        assert_eq!(observation[1], 0.0);
        assert_relative_eq!(observation[2], 40.0);
        assert_relative_eq!(observation[3], 25.0);
    }

    #[test]
    fn test_observation_missing_bodies() {
        let scene = Scene::parse(
            r#"
            [[bodies]]
            type = "circle"
            position = [0.0, 0.0]
            radius = 1.0
            "#,
        )
        .unwrap();
        let sim = Simulator::new(scene, 1, SIM_DT);

        assert_eq!(sim.observe(), [0.0; 4]);
    }

    #[test]
    fn test_right_push_tilts_beam() {
        let mut sim = fulcrum(12345);
        sim.reset();

        for _ in 0..60 {
            sim.step(1.0);
        }

        assert!(sim.actuator().angle > 0.0);
        assert!(sim.observe()[0] > 0.0);
    }

    #[test]
    fn test_beam_pose_survives_contacts() {
        let mut sim = fulcrum(12345);
        sim.reset();

        // Hammer the beam with the resting ball for a while
        for _ in 0..600 {
            sim.step(0.0);
            let beam = sim.world().body(2).unwrap();
            assert_eq!(beam.angle, sim.actuator().angle);
            assert_eq!(beam.velocity, Vec2::zero());
            assert_eq!(beam.angular_velocity, 0.0);
        }
    }
}
