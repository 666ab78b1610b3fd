//! Frame stepping
//!
//! One call per rendered frame: drain commands, advance rings, resolve
//! collisions, reap escapes, integrate the ball, bounce off the screen
//! edges, age effects.

use crate::consts::{MAX_FRAME_DT, MAX_SHOCKWAVES};

use super::state::{Shockwave, SimState};

/// Discrete external commands, consumed once per frame.
///
/// Each maps to a pure mutation of state or runtime knobs and produces no
/// output besides the mutation. Originally keyboard events; the queue keeps
/// the core independent of any input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Rebuild the ring set at the standard layout
    ResetRings,
    /// Respawn the ball
    ResetBall,
    TogglePause,
    /// `gravity = -gravity`
    InvertGravity,
    /// Gravity on/off without losing its magnitude or sign
    ToggleGravity,
    /// Grow or shrink the trail capacity, clamped to [1, 200]
    AdjustTrail(i32),
    /// Nudge the target-frame-rate knob for the pacing layer, [15, 240]
    AdjustTargetFps(i32),
}

/// Advance the simulation by one frame.
///
/// Commands apply even while paused (unpausing has to work); physics only
/// runs unpaused. `dt` is the wall-clock delta supplied by the external
/// pacing layer, clamped to [`MAX_FRAME_DT`]; a non-positive delta is a
/// no-op.
pub fn step(state: &mut SimState, commands: &[Command], dt: f32) {
    for &cmd in commands {
        apply_command(state, cmd);
    }

    if state.paused || !(dt > 0.0) {
        return;
    }
    let dt = dt.min(MAX_FRAME_DT);

    state.frames += 1;
    state.elapsed += dt;

    // Rings advance first so collision response agrees with the rotation
    // that gets drawn this frame
    let shrink_rate = state.cfg.shrink_rate;
    state.rings.step_all(shrink_rate, dt);

    state.rings.resolve_collisions(&mut state.ball);

    let destroyed = state.rings.reap_deactivated(&state.cfg, &mut state.rng);
    for dead in &destroyed {
        if state.effects.len() >= MAX_SHOCKWAVES {
            state.effects.remove(0);
        }
        state.effects.push(Shockwave::from_ring(dead));
    }

    state.ball.integrate(&state.physics, dt, &mut state.rng);

    resolve_wall_bounce(state);

    for effect in &mut state.effects {
        effect.update(dt);
    }
    state.effects.retain(|e| e.alive());
}

fn apply_command(state: &mut SimState, cmd: Command) {
    log::debug!("command: {:?}", cmd);
    match cmd {
        Command::ResetRings => state.reset_rings(),
        Command::ResetBall => state.reset_ball(),
        Command::TogglePause => state.paused = !state.paused,
        Command::InvertGravity => state.physics.gravity = -state.physics.gravity,
        Command::ToggleGravity => {
            state.physics.gravity_enabled = !state.physics.gravity_enabled;
        }
        Command::AdjustTrail(delta) => {
            let cap = (state.physics.trail_capacity as i64 + delta as i64).clamp(1, 200) as usize;
            state.physics.trail_capacity = cap;
            let trail = &mut state.ball.trail;
            if trail.len() > cap {
                let excess = trail.len() - cap;
                trail.drain(..excess);
            }
        }
        Command::AdjustTargetFps(delta) => {
            state.physics.target_fps =
                (state.physics.target_fps as i64 + delta as i64).clamp(15, 240) as u32;
        }
    }
}

/// Keep the ball on screen.
///
/// Reflects the crossed velocity component scaled by wall restitution and
/// clamps the position in-bounds. On the gravity-facing edge a minimum
/// rebound speed counters gravity's steady energy injection, which would
/// otherwise eventually pin the ball to that edge.
fn resolve_wall_bounce(state: &mut SimState) {
    let cfg = &state.cfg;
    let physics = &state.physics;
    let ball = &mut state.ball;
    let r = ball.radius;

    if ball.pos.x - r <= 0.0 || ball.pos.x + r >= cfg.width {
        ball.vel.x = -ball.vel.x * cfg.wall_restitution;
        ball.pos.x = ball.pos.x.clamp(r, cfg.width - r);
    }

    if ball.pos.y - r <= 0.0 || ball.pos.y + r >= cfg.height {
        let hit_bottom = ball.pos.y + r >= cfg.height;
        ball.vel.y = -ball.vel.y * cfg.wall_restitution;
        ball.pos.y = ball.pos.y.clamp(r, cfg.height - r);

        // Rebound floor on whichever edge gravity presses the ball against
        if physics.gravity_enabled && cfg.floor_rebound_min > 0.0 {
            if physics.gravity > 0.0 && hit_bottom {
                ball.vel.y = ball.vel.y.min(-cfg.floor_rebound_min);
            } else if physics.gravity < 0.0 && !hit_bottom {
                ball.vel.y = ball.vel.y.max(cfg.floor_rebound_min);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimConfig;
    use crate::sim::ring::Ring;
    use crate::sim::state::Ball;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn new_state(cfg: SimConfig) -> SimState {
        SimState::new(cfg).unwrap()
    }

    #[test]
    fn test_left_wall_bounce() {
        let mut state = new_state(SimConfig::default());
        state.ball = Ball::new(Vec2::new(7.0, 300.0), Vec2::new(-50.0, 0.0), 8.0);

        resolve_wall_bounce(&mut state);
        assert!(state.ball.vel.x > 0.0);
        assert_eq!(state.ball.vel.x, 50.0);
        assert_eq!(state.ball.pos.x, 8.0);
    }

    #[test]
    fn test_bottom_edge_rebound_floor() {
        let mut state = new_state(SimConfig::default());
        // Dribbling on the bottom edge with almost no speed left
        state.ball = Ball::new(Vec2::new(400.0, 595.0), Vec2::new(0.0, 10.0), 8.0);

        resolve_wall_bounce(&mut state);
        assert!(state.ball.vel.y <= -state.cfg.floor_rebound_min);
        assert_eq!(state.ball.pos.y, 592.0);
    }

    #[test]
    fn test_inverted_gravity_moves_rebound_floor_to_top() {
        let mut state = new_state(SimConfig::default());
        state.physics.gravity = -state.physics.gravity;
        state.ball = Ball::new(Vec2::new(400.0, 5.0), Vec2::new(0.0, -10.0), 8.0);

        resolve_wall_bounce(&mut state);
        assert!(state.ball.vel.y >= state.cfg.floor_rebound_min);
        assert_eq!(state.ball.pos.y, 8.0);
    }

    #[test]
    fn test_pause_freezes_physics_but_not_commands() {
        let mut state = new_state(SimConfig::default());

        step(&mut state, &[Command::TogglePause], DT);
        assert!(state.paused);
        assert_eq!(state.frames, 0);

        let before = state.ball.pos;
        step(&mut state, &[], DT);
        assert_eq!(state.frames, 0);
        assert_eq!(state.ball.pos, before);

        // Commands still land while paused
        let g = state.physics.gravity;
        step(&mut state, &[Command::InvertGravity], DT);
        assert_eq!(state.physics.gravity, -g);

        step(&mut state, &[Command::TogglePause], DT);
        assert!(!state.paused);
        assert_eq!(state.frames, 1);
    }

    #[test]
    fn test_non_positive_dt_is_a_no_op() {
        let mut state = new_state(SimConfig::default());
        let before = state.ball.pos;
        step(&mut state, &[], 0.0);
        step(&mut state, &[], -0.25);
        assert_eq!(state.frames, 0);
        assert_eq!(state.ball.pos, before);
    }

    #[test]
    fn test_invert_and_toggle_gravity() {
        let mut state = new_state(SimConfig::default());
        let g = state.physics.gravity;

        step(&mut state, &[Command::InvertGravity], DT);
        assert_eq!(state.physics.gravity, -g);

        step(&mut state, &[Command::ToggleGravity], DT);
        assert!(!state.physics.gravity_enabled);
        // Magnitude survives the off period
        assert_eq!(state.physics.gravity, -g);

        step(&mut state, &[Command::ToggleGravity], DT);
        assert!(state.physics.gravity_enabled);
    }

    #[test]
    fn test_adjust_trail_clamps_and_truncates() {
        let mut state = new_state(SimConfig::default());
        for _ in 0..40 {
            step(&mut state, &[], DT);
        }
        assert_eq!(state.ball.trail.len(), 30);

        step(&mut state, &[Command::AdjustTrail(-1000)], DT);
        assert_eq!(state.physics.trail_capacity, 1);
        assert!(state.ball.trail.len() <= 2); // one kept + this frame's record

        step(&mut state, &[Command::AdjustTrail(10_000)], DT);
        assert_eq!(state.physics.trail_capacity, 200);
    }

    #[test]
    fn test_adjust_target_fps_clamps() {
        let mut state = new_state(SimConfig::default());
        step(&mut state, &[Command::AdjustTargetFps(10_000)], DT);
        assert_eq!(state.physics.target_fps, 240);
        step(&mut state, &[Command::AdjustTargetFps(-10_000)], DT);
        assert_eq!(state.physics.target_fps, 15);
    }

    #[test]
    fn test_reset_commands() {
        let mut state = new_state(SimConfig::default());
        state.ball.pos = Vec2::new(10.0, 10.0);
        for ring in &mut state.rings.rings {
            ring.state = crate::sim::ring::RingState::Inactive;
        }

        step(&mut state, &[Command::ResetBall, Command::ResetRings], DT);
        // One frame of drift after the respawn, at most launch_speed * dt
        let drift = state.cfg.ball_launch_speed * DT;
        assert!(
            (state.ball.pos.x - state.cfg.ball_spawn.x).abs()
                <= state.cfg.ball_spawn_jitter + drift
        );
        assert_eq!(state.rings.active_count(), state.cfg.ring_radii.len());
    }

    #[test]
    fn test_escape_destroys_ring_and_spawns_shockwave() {
        let cfg = SimConfig {
            gravity: 0.0,
            min_speed: 0.0,
            shrink_rate: 0.0,
            regenerate: false,
            ..Default::default()
        };
        let mut state = new_state(cfg);

        // Single stationary ring, gap sector at 0°, ball flying out through it
        let ring = Ring::new(state.cfg.center, 100.0, 0.0, 0.0, 0, &state.cfg);
        state.rings.rings = vec![ring];
        state.ball = Ball::new(
            state.cfg.center + Vec2::new(88.0, 0.0),
            Vec2::new(240.0, 0.0),
            8.0,
        );

        let mut peak_effects = 0;
        for _ in 0..30 {
            step(&mut state, &[], DT);
            peak_effects = peak_effects.max(state.effects.len());
        }

        assert_eq!(state.rings.active_count(), 0);
        assert_eq!(peak_effects, 1);
        assert!(!state.effects.is_empty());
        // The ball sailed through without ever being reflected
        assert_eq!(state.ball.vel, Vec2::new(240.0, 0.0));
    }

    #[test]
    fn test_escape_with_regeneration_replaces_ring() {
        let cfg = SimConfig {
            gravity: 0.0,
            min_speed: 0.0,
            shrink_rate: 0.0,
            ..Default::default()
        };
        let mut state = new_state(cfg);

        let ring = Ring::new(state.cfg.center, 100.0, 0.0, 0.0, 0, &state.cfg);
        state.rings.rings = vec![ring];
        state.ball = Ball::new(
            state.cfg.center + Vec2::new(88.0, 0.0),
            Vec2::new(240.0, 0.0),
            8.0,
        );

        for _ in 0..10 {
            step(&mut state, &[], DT);
        }

        // Replacement arrived active with fresh geometry
        assert_eq!(state.rings.active_count(), 1);
        assert!(!state.effects.is_empty());
    }

    #[test]
    fn test_determinism() {
        let cfg = SimConfig {
            seed: 99_999,
            ..Default::default()
        };
        let mut a = new_state(cfg.clone());
        let mut b = new_state(cfg);

        let script: &[&[Command]] = &[
            &[],
            &[Command::InvertGravity],
            &[],
            &[Command::ResetBall],
            &[],
            &[Command::InvertGravity],
        ];
        for commands in script.iter().cycle().take(600) {
            step(&mut a, commands, DT);
            step(&mut b, commands, DT);
        }

        assert_eq!(a.frames, b.frames);
        assert_eq!(a.ball.pos, b.ball.pos);
        assert_eq!(a.ball.vel, b.ball.vel);
        assert_eq!(a.rings.rings.len(), b.rings.rings.len());
        for (ra, rb) in a.rings.rings.iter().zip(&b.rings.rings) {
            assert_eq!(ra.radius, rb.radius);
            assert_eq!(ra.angle, rb.angle);
            assert_eq!(ra.state, rb.state);
        }
    }
}
