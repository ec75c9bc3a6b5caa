use ball_beam::{environment::Environment, physics::DebugFlags, simulator::SIM_DT, window};
use miette::Result;

/// Scene shipped with the repository.
const DEFAULT_SCENE: &str = "assets/fulcrum.toml";

/// Seed of the first episode.
const DEFAULT_SEED: u32 = 12345;

/// How many steps headless mode runs before exiting.
const HEADLESS_STEPS: u64 = 1_000_000;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let headless = std::env::args()
        .skip(1)
        .any(|arg| arg == "--headless" || arg == "-h");

    let mut environment = Environment::new(DEFAULT_SCENE, DEFAULT_SEED, SIM_DT, headless)?;

    if headless {
        run_headless(&mut environment);

        Ok(())
    } else {
        environment.simulator_mut().world_mut().debug = DebugFlags {
            show_velocity: true,
            show_contacts: true,
        };

        window::run(environment)
    }
}

/// Drive idle episodes as fast as possible and log the throughput.
fn run_headless(environment: &mut Environment) {
    log::info!("running headless for {HEADLESS_STEPS} steps");

    environment.reset();

    let start = std::time::Instant::now();
    let mut episode = 0u32;
    let mut episode_return = 0.0f32;

    for _ in 0..HEADLESS_STEPS {
        let result = environment.step(0.0);
        episode_return += result.reward;

        if result.terminated || result.truncated {
            episode += 1;
            log::info!(
                "episode {episode}: steps={} return={episode_return:.2} terminated={}",
                environment.step_count(),
                result.terminated
            );

            episode_return = 0.0;
            environment.reset();
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    log::info!(
        "{HEADLESS_STEPS} steps in {elapsed:.2}s ({:.0} steps/s)",
        HEADLESS_STEPS as f64 / elapsed
    );
}
