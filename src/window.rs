//! Interactive window around the environment.

use game_loop::winit::{dpi::LogicalSize, window::WindowBuilder};
use miette::{IntoDiagnostic, Result};
use pixels::{PixelsBuilder, SurfaceTexture};
use winit::{
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::EventLoop,
};

use crate::{environment::Environment, input::Input, SIZE};

/// Fixed update rate, matching the 240 Hz simulation timestep.
const UPDATES_PER_SECOND: u32 = 240;

/// Open a window and run the environment interactively.
///
/// Hold A or D to steer the beam, press R to restart the episode with a
/// fresh seed and Escape to quit. Finished episodes restart automatically.
pub fn run(environment: Environment) -> Result<()> {
    let event_loop = EventLoop::new();
    let logical_size = LogicalSize::new(SIZE.w as f64 / 2.0, SIZE.h as f64 / 2.0);
    let window = WindowBuilder::new()
        .with_title("Ball & Beam")
        .with_inner_size(logical_size)
        .with_min_inner_size(logical_size)
        .build(&event_loop)
        .into_diagnostic()?;

    let pixels = {
        let surface_texture = SurfaceTexture::new(SIZE.w as u32, SIZE.h as u32, &window);
        PixelsBuilder::new(SIZE.w as u32, SIZE.h as u32, surface_texture)
            .clear_color(pixels::wgpu::Color {
                r: 0.078,
                g: 0.078,
                b: 0.118,
                a: 1.0,
            })
            .build()
    }
    .into_diagnostic()?;

    let mut buffer = vec![0u32; SIZE.w * SIZE.h];

    game_loop::game_loop(
        event_loop,
        window,
        (environment, pixels, Input::default()),
        UPDATES_PER_SECOND,
        0.1,
        move |g| {
            let (environment, _, input) = &mut g.game;

            if input.reset_pressed {
                input.reset_pressed = false;

                let seed = fastrand::u32(..);
                log::info!("restarting episode with seed {seed}");
                environment.simulator_mut().set_seed(seed);
                environment.reset();
            }

            let result = environment.step(input.action());
            if result.terminated || result.truncated {
                log::info!(
                    "episode over after {} steps (terminated: {})",
                    environment.step_count(),
                    result.terminated
                );
                environment.reset();
            }
        },
        move |g| {
            g.game.0.render(&mut buffer, SIZE.w, SIZE.h);

            // The buffer holds ARGB words, the surface wants RGBA bytes
            g.game
                .1
                .frame_mut()
                .chunks_exact_mut(4)
                .zip(buffer.iter())
                .for_each(|(target, source)| {
                    target[0] = (source >> 16) as u8;
                    target[1] = (source >> 8) as u8;
                    target[2] = *source as u8;
                    target[3] = (source >> 24) as u8;
                });

            if let Err(err) = g.game.1.render() {
                log::error!("rendering failed: {err}");
                g.exit();
            }
        },
        move |g, event| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => g.exit(),

            Event::WindowEvent {
                event: WindowEvent::Resized(new_size),
                ..
            } => {
                if let Err(err) = g.game.1.resize_surface(new_size.width, new_size.height) {
                    log::error!("resizing surface failed: {err}");
                    g.exit();
                }
            }

            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                virtual_keycode,
                                state,
                                ..
                            },
                        ..
                    },
                ..
            } => match virtual_keycode {
                Some(VirtualKeyCode::A | VirtualKeyCode::Left) => {
                    g.game.2.left_pressed = state == &ElementState::Pressed;
                }
                Some(VirtualKeyCode::D | VirtualKeyCode::Right) => {
                    g.game.2.right_pressed = state == &ElementState::Pressed;
                }
                Some(VirtualKeyCode::R) => {
                    if state == &ElementState::Pressed {
                        g.game.2.reset_pressed = true;
                    }
                }
                Some(VirtualKeyCode::Escape) => g.exit(),
                _ => (),
            },
            _ => (),
        },
    );
}
