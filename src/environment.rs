//! Episodic reinforcement-learning environment around the simulator.
//!
//! Adds the episode step counter, the shaped reward and the termination
//! policy on top of the raw physics. Termination means task failure (the
//! ball was lost), truncation means the time limit ran out; only failure
//! carries the terminal penalty.

use miette::Result;

use crate::{
    actuator::{BEAM_ANGLE_MAX, MAX_BEAM_SPEED},
    render,
    simulator::{Simulator, BALL_BODY_INDEX, OBS_DIM},
};

/// Episode length limit in steps.
pub const MAX_EPISODE_STEPS: u32 = 2400;

/// Terminal penalty when the ball hits the floor.
const FAILURE_REWARD: f32 = -10.0;

/// Tolerance in pixels for the floor contact check.
const FLOOR_TOLERANCE: f32 = 1.0;

/// Normalization of the ball position term, in pixels.
const POSITION_SCALE: f32 = 500.0;

/// Normalization of the ball velocity term, in pixels/sec.
const VELOCITY_SCALE: f32 = 500.0;

/// Shaped reward weights: angle, angular velocity, position, velocity.
const REWARD_WEIGHTS: [f32; 4] = [1.0, 0.5, 1.5, 0.5];

/// Result of resetting or stepping the environment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepResult {
    /// Observation after the transition.
    pub observation: [f32; OBS_DIM],
    /// Reward for the transition.
    pub reward: f32,
    /// The episode ended in failure.
    pub terminated: bool,
    /// The episode hit the time limit.
    pub truncated: bool,
}

/// Episodic ball-on-beam environment.
pub struct Environment {
    /// Owned simulator.
    simulator: Simulator,
    /// Whether `render` draws anything.
    render_enabled: bool,
    /// Steps taken in the current episode.
    step_count: u32,
}

impl Environment {
    /// Create an environment around a scene file.
    pub fn new(scene_path: &str, seed: u32, dt: f32, headless: bool) -> Result<Self> {
        let simulator = Simulator::from_path(scene_path, seed, dt)?;

        Ok(Self::from_simulator(simulator, headless))
    }

    /// Wrap an existing simulator.
    pub fn from_simulator(simulator: Simulator, headless: bool) -> Self {
        let render_enabled = !headless;
        let step_count = 0;

        Self {
            simulator,
            render_enabled,
            step_count,
        }
    }

    /// Start a fresh episode.
    pub fn reset(&mut self) -> StepResult {
        self.simulator.reset();
        self.step_count = 0;

        StepResult {
            observation: self.simulator.observe(),
            ..StepResult::default()
        }
    }

    /// Advance the episode by one action.
    pub fn step(&mut self, action: f32) -> StepResult {
        self.simulator.step(action);
        self.step_count += 1;

        let observation = self.simulator.observe();

        // Failure beats everything else and carries the terminal penalty
        if self.ball_hit_floor() {
            return StepResult {
                observation,
                reward: FAILURE_REWARD,
                terminated: true,
                truncated: false,
            };
        }

        // The time limit is a neutral cutoff, the step still gets the
        // shaped reward
        let truncated = self.step_count >= MAX_EPISODE_STEPS;
        let reward = Self::shaped_reward(&observation);

        StepResult {
            observation,
            reward,
            terminated: false,
            truncated,
        }
    }

    /// Draw the current state into a pixel buffer.
    ///
    /// No-op when rendering is disabled; never touches simulation state.
    pub fn render(&self, frame: &mut [u32], width: usize, height: usize) {
        if !self.render_enabled {
            return;
        }

        render::draw_world(self.simulator.world(), frame, width, height);
    }

    /// Toggle rendering.
    pub fn set_render_enabled(&mut self, enabled: bool) {
        self.render_enabled = enabled;
    }

    /// The wrapped simulator.
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Mutable access to the wrapped simulator.
    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    /// Steps taken in the current episode.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Whether the ball's bottom edge reached the floor.
    fn ball_hit_floor(&self) -> bool {
        let world = self.simulator.world();
        let Some(bounds) = world.bounds() else {
            return false;
        };
        let Some(ball) = world.body(BALL_BODY_INDEX) else {
            return false;
        };

        ball.position.y + ball.radius() >= bounds.bottom - FLOOR_TOLERANCE
    }

    /// Quadratic cost on the normalized state, negated.
    fn shaped_reward(observation: &[f32; OBS_DIM]) -> f32 {
        let normalized = [
            observation[0] / BEAM_ANGLE_MAX,
            observation[1] / MAX_BEAM_SPEED,
            observation[2] / POSITION_SCALE,
            observation[3] / VELOCITY_SCALE,
        ];

        -REWARD_WEIGHTS
            .iter()
            .zip(normalized)
            .map(|(weight, value)| weight * value * value)
            .sum::<f32>()
    }
}
