//! Scene descriptions loaded from TOML files.
//!
//! A scene declares the world configuration and the list of bodies; the
//! simulator instantiates a fresh world from it on every reset so episodes
//! always start from the same deterministic base state.

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use vek::Vec2;

use crate::physics::{body::Body, World};

/// Timestep a freshly instantiated world gets.
///
/// Placeholder only, the simulator overwrites it with its own timestep.
const DEFAULT_DT: f32 = 1.0 / 60.0;

/// A parsed scene description.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    /// World configuration.
    #[serde(default)]
    world: WorldConfig,
    /// Bodies in declaration order, which fixes their world indices.
    #[serde(default)]
    bodies: Vec<BodyConfig>,
}

/// World section of a scene file.
#[derive(Debug, Clone, Deserialize)]
struct WorldConfig {
    /// Gravity in pixels/sec^2.
    #[serde(default = "default_gravity")]
    gravity: [f32; 2],
    /// Optional axis-aligned boundary.
    bounds: Option<BoundsConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct BoundsConfig {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// A single body entry of a scene file.
#[derive(Debug, Clone, Deserialize)]
struct BodyConfig {
    /// Shape, tagged by the `type` field.
    #[serde(flatten)]
    shape: ShapeConfig,
    /// Center of mass in world pixels.
    position: [f32; 2],
    #[serde(default = "default_mass")]
    mass: f32,
    #[serde(default = "default_restitution")]
    restitution: f32,
    #[serde(default)]
    velocity: [f32; 2],
    #[serde(default)]
    angular_velocity: f32,
    #[serde(default)]
    angle: f32,
    #[serde(default = "default_color")]
    color: [u8; 4],
    /// Immovable body.
    #[serde(rename = "static", default)]
    is_static: bool,
    /// Marks the actuator-driven beam.
    #[serde(default)]
    actuator: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ShapeConfig {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

fn default_gravity() -> [f32; 2] {
    [0.0, 98.1]
}

fn default_mass() -> f32 {
    1.0
}

fn default_restitution() -> f32 {
    0.8
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Scene {
    /// Load a scene from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading scene file '{path}'"))?;

        Self::parse(&source).wrap_err_with(|| format!("loading scene file '{path}'"))
    }

    /// Parse a scene from TOML source.
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source)
            .into_diagnostic()
            .wrap_err("parsing scene")
    }

    /// Build a fresh world from the description.
    ///
    /// Bodies beyond the world capacity are logged and skipped; everything
    /// that fits is kept.
    pub fn instantiate(&self) -> World {
        let [gravity_x, gravity_y] = self.world.gravity;
        let mut world = World::new(Vec2::new(gravity_x, gravity_y), DEFAULT_DT);

        if let Some(bounds) = self.world.bounds {
            world.set_bounds(bounds.left, bounds.top, bounds.right, bounds.bottom);
        }

        for (index, config) in self.bodies.iter().enumerate() {
            let position = Vec2::new(config.position[0], config.position[1]);
            let mut body = match config.shape {
                ShapeConfig::Circle { radius } => {
                    Body::circle(position, radius, config.mass, config.restitution)
                }
                ShapeConfig::Rect { width, height } => {
                    Body::rect(position, width, height, config.mass, config.restitution)
                }
            };

            body.velocity = Vec2::new(config.velocity[0], config.velocity[1]);
            body.angular_velocity = config.angular_velocity;
            body.angle = config.angle;
            body.color = config.color;
            if config.is_static {
                body.make_static();
            }

            match world.add_body(body) {
                Some(body_index) => {
                    if config.actuator {
                        world.actuator_body = Some(body_index);
                        world.actuator_pivot = position;
                    }
                }
                None => log::warn!("world is full, skipping scene body {index}"),
            }
        }

        world
    }
}
