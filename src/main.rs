//! Ring Fall entry point
//!
//! Headless demo driver: builds the simulation, feeds it fixed frame deltas
//! and logs snapshots. Windowing, input handling and frame pacing live
//! outside the core; this binary stands in for them.

use ring_fall::SimConfig;
use ring_fall::sim::{Command, SimState, step};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = SimConfig::default();
    let mut state = SimState::new(cfg)?;
    log::info!(
        "ring-fall starting: {} rings, seed {}",
        state.rings.rings.len(),
        state.cfg.seed
    );

    let dt = 1.0 / state.physics.target_fps as f32;
    let frames_per_second = state.physics.target_fps as u64;
    let total_frames = frames_per_second * 30;

    for frame in 0..total_frames {
        // Flip gravity halfway through to exercise the command path
        let commands: &[Command] = if frame == total_frames / 2 {
            &[Command::InvertGravity]
        } else {
            &[]
        };
        step(&mut state, commands, dt);

        if frame % frames_per_second == 0 {
            log::info!(
                "t={:>4.1}s ball=({:>5.1},{:>5.1}) speed={:>6.1} rings={} effects={}",
                state.elapsed,
                state.ball.pos.x,
                state.ball.pos.y,
                state.ball.vel.length(),
                state.rings.active_count(),
                state.effects.len()
            );
        }
    }

    log::info!(
        "done after {} frames ({:.1}s simulated)",
        state.frames,
        state.elapsed
    );
    Ok(())
}
