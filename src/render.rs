//! Debug drawing of the physics world into a pixel buffer.
//!
//! Display only: reads the world, never mutates it.

use line_drawing::Bresenham;
use vek::Vec2;

use crate::physics::{
    body::{Body, Shape},
    World,
};

/// Background fill color.
const BACKGROUND: u32 = 0xff14141e;

/// Velocity vector color.
const VELOCITY_COLOR: u32 = 0xff00aaaa;

/// Contact marker color.
const CONTACT_COLOR: u32 = 0xffff0000;

/// How many pixels a velocity vector spans per pixel/sec.
const VELOCITY_SCALE: f32 = 0.25;

/// Draw all bodies and any enabled debug overlays.
pub fn draw_world(world: &World, frame: &mut [u32], width: usize, height: usize) {
    puffin::profile_function!();

    frame.fill(BACKGROUND);

    for body in world.bodies() {
        draw_body(body, frame, width, height);
    }

    if world.debug.show_velocity {
        for body in world.bodies() {
            if body.is_static() {
                continue;
            }
            draw_line(
                body.position,
                body.position + body.velocity * VELOCITY_SCALE,
                frame,
                width,
                height,
                VELOCITY_COLOR,
            );
        }
    }

    if world.debug.show_contacts {
        for collision in world.contacts() {
            draw_marker(collision.contact, frame, width, height, CONTACT_COLOR);
        }
    }
}

fn draw_body(body: &Body, frame: &mut [u32], width: usize, height: usize) {
    let color = u32::from_be_bytes([body.color[3], body.color[0], body.color[1], body.color[2]]);

    match body.shape {
        Shape::Circle { radius } => {
            draw_circle(body.position, radius, frame, width, height, color);
        }
        Shape::Rect { .. } => {
            let Some(corners) = body.corners() else {
                return;
            };

            // Outline between each corner and the next
            for index in 0..corners.len() {
                draw_line(
                    corners[index],
                    corners[(index + 1) % corners.len()],
                    frame,
                    width,
                    height,
                    color,
                );
            }
        }
    }
}

/// Midpoint circle outline.
fn draw_circle(
    center: Vec2<f32>,
    radius: f32,
    frame: &mut [u32],
    width: usize,
    height: usize,
    color: u32,
) {
    let center = center.as_::<i32>();
    let mut x = radius.round() as i32;
    let mut y = 0;
    let mut error = 1 - x;

    while x >= y {
        for (dx, dy) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            draw_point(center.x + dx, center.y + dy, frame, width, height, color);
        }

        y += 1;
        if error < 0 {
            error += 2 * y + 1;
        } else {
            x -= 1;
            error += 2 * (y - x) + 1;
        }
    }
}

fn draw_line(
    start: Vec2<f32>,
    end: Vec2<f32>,
    frame: &mut [u32],
    width: usize,
    height: usize,
    color: u32,
) {
    for (x, y) in Bresenham::new(
        (start.x as i32, start.y as i32),
        (end.x as i32, end.y as i32),
    ) {
        draw_point(x, y, frame, width, height, color);
    }
}

/// Small plus-shaped marker.
fn draw_marker(position: Vec2<f32>, frame: &mut [u32], width: usize, height: usize, color: u32) {
    let position = position.as_::<i32>();

    for (dx, dy) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
        draw_point(position.x + dx, position.y + dy, frame, width, height, color);
    }
}

fn draw_point(x: i32, y: i32, frame: &mut [u32], width: usize, height: usize, color: u32) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }

    frame[x as usize + y as usize * width] = color;
}
