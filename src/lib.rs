//! Ball-on-beam reinforcement-learning environment with a deterministic 2D
//! physics core.
//!
//! A training loop drives [`Environment::step`] with a normalized motor
//! command and gets back a 4-dimensional observation, a shaped reward and
//! the termination flags. Identical scene, seed, timestep and action
//! sequence replay bit-identically.

pub mod actuator;
pub mod environment;
pub mod input;
pub mod math;
pub mod physics;
pub mod random;
pub mod render;
pub mod scene;
pub mod simulator;
pub mod window;

use vek::Extent2;

pub use environment::{Environment, StepResult, MAX_EPISODE_STEPS};
pub use simulator::{Simulator, OBS_DIM, SIM_DT};

/// Size of the world and the render buffer in pixels.
pub const SIZE: Extent2<usize> = Extent2 { w: 1920, h: 1080 };
