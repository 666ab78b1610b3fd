//! Simulation state: ball, runtime physics knobs, ring set, effects
//!
//! Everything a presentation layer needs to draw lives here as plain data.

use anyhow::Result;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::consts::RING_PALETTE;

use super::ring::{Ring, RingState};

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    /// Fixed for the whole run
    pub radius: f32,
    /// Past positions, oldest first
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            trail: Vec::new(),
        }
    }

    /// Spawn at the configured point with horizontal jitter and a random
    /// sideways launch, vertical velocity zero
    pub fn spawn(cfg: &SimConfig, rng: &mut Pcg32) -> Self {
        let x = cfg.ball_spawn.x
            + rng.random_range(-cfg.ball_spawn_jitter..=cfg.ball_spawn_jitter);
        let vx = rng.random_range(-cfg.ball_launch_speed..=cfg.ball_launch_speed);
        Self::new(
            Vec2::new(x, cfg.ball_spawn.y),
            Vec2::new(vx, 0.0),
            cfg.ball_radius,
        )
    }

    /// Record the current position, evicting the oldest past capacity
    pub fn record_trail(&mut self, capacity: usize) {
        self.trail.push(TrailPoint {
            pos: self.pos,
            speed: self.vel.length(),
        });
        while self.trail.len() > capacity {
            self.trail.remove(0);
        }
    }

    /// `vy += g * dt`; gravity is signed, down is positive
    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.vel.y += gravity * dt;
    }

    /// One frame of motion: trail, position, gravity, damping, anti-stall
    /// speed floor
    pub fn integrate(&mut self, physics: &Physics, dt: f32, rng: &mut Pcg32) {
        self.record_trail(physics.trail_capacity);
        self.pos += self.vel * dt;
        if physics.gravity_enabled {
            self.apply_gravity(physics.gravity, dt);
        }
        if physics.damping_per_sec < 1.0 {
            self.vel *= physics.damping_per_sec.powf(dt);
        }
        self.enforce_speed_floor(physics, rng);
    }

    /// A closed elastic system can settle into a degenerate low-energy loop.
    /// The floor rescales velocity back up preserving direction (random
    /// direction from a standstill) and jitters it so no orbit stays
    /// periodic.
    fn enforce_speed_floor(&mut self, physics: &Physics, rng: &mut Pcg32) {
        if physics.min_speed <= 0.0 {
            return;
        }
        let speed = self.vel.length();
        if speed >= physics.min_speed {
            return;
        }
        if speed <= f32::EPSILON {
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            self.vel = Vec2::new(theta.cos(), theta.sin()) * physics.min_speed;
        } else {
            self.vel *= physics.min_speed / speed;
        }
        if physics.stall_jitter > 0.0 {
            self.vel += Vec2::new(
                rng.random_range(-physics.stall_jitter..=physics.stall_jitter),
                rng.random_range(-physics.stall_jitter..=physics.stall_jitter),
            );
        }
    }
}

/// Runtime-mutable physics knobs.
///
/// Initialized from [`SimConfig`] and mutated only by commands, never read
/// from globals, so every step is reproducible from (state, commands, dt).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Physics {
    pub gravity: f32,
    pub gravity_enabled: bool,
    pub damping_per_sec: f32,
    pub min_speed: f32,
    pub stall_jitter: f32,
    pub trail_capacity: usize,
    /// Knob for the external pacing layer; the core never sleeps on it
    pub target_fps: u32,
}

impl Physics {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            gravity: cfg.gravity,
            gravity_enabled: true,
            damping_per_sec: cfg.damping_per_sec,
            min_speed: cfg.min_speed,
            stall_jitter: cfg.stall_jitter,
            trail_capacity: cfg.trail_capacity,
            target_fps: cfg.target_fps,
        }
    }
}

/// Last-known shape of a ring destroyed this frame
#[derive(Debug, Clone, Copy)]
pub struct DestroyedRing {
    pub center: Vec2,
    pub radius: f32,
    pub color: u32,
}

/// Fire-and-forget marker spawned where a ring died.
///
/// Expands and fades; the renderer maps `life` to opacity. Not
/// collision-relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shockwave {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    /// 1 -> 0, dead at zero
    pub life: f32,
}

impl Shockwave {
    /// Expansion speed (px/s)
    const EXPAND_RATE: f32 = 220.0;
    /// Life drained per second
    const FADE_RATE: f32 = 1.6;

    pub fn from_ring(ring: &DestroyedRing) -> Self {
        Self {
            pos: ring.center,
            radius: ring.radius,
            color: ring.color,
            life: 1.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.radius += Self::EXPAND_RATE * dt;
        self.life -= Self::FADE_RATE * dt;
    }

    pub fn alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Ordered collection of concentric rings, outermost first.
///
/// Order is the draw/check order only; collision checks are independent per
/// ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingSet {
    pub rings: Vec<Ring>,
    /// Center shared by every ring
    pub center: Vec2,
}

impl RingSet {
    /// Standard concentric layout: configured radii outermost first, spin
    /// speed stepping up toward the center, direction alternating per ring,
    /// random initial angles, palette colors cycling
    pub fn standard(cfg: &SimConfig, rng: &mut Pcg32) -> Self {
        let rings = cfg
            .ring_radii
            .iter()
            .enumerate()
            .map(|(i, &radius)| {
                let speed = (cfg.spin_min + 10.0 * i as f32).min(cfg.spin_max);
                let spin = if i % 2 == 0 { -speed } else { speed };
                Ring::new(
                    cfg.center,
                    radius,
                    rng.random_range(0.0..360.0),
                    spin,
                    i as u32 % RING_PALETTE,
                    cfg,
                )
            })
            .collect();
        Self {
            rings,
            center: cfg.center,
        }
    }

    /// Rotate and shrink every active ring
    pub fn step_all(&mut self, shrink_rate: f32, dt: f32) {
        for ring in self.rings.iter_mut().filter(|r| r.is_active()) {
            ring.rotate(dt);
            ring.shrink(shrink_rate, dt);
        }
    }

    /// Rings still in play
    pub fn active_count(&self) -> usize {
        self.rings.iter().filter(|r| r.is_active()).count()
    }

    /// Check the ball against every ring in order, bouncing off each solid
    /// contact. A simultaneous double contact resolves sequentially in ring
    /// order.
    pub fn resolve_collisions(&mut self, ball: &mut Ball) {
        for ring in &mut self.rings {
            if ring.check_collision(ball) {
                ring.resolve_bounce(ball);
            }
        }
    }

    /// Collect rings that escaped this frame.
    ///
    /// With regeneration on, each is replaced in place by a fresh active
    /// ring at a non-overlapping radius; otherwise it goes inert. Returns
    /// the destroyed rings' last-known shape for effect spawning.
    pub fn reap_deactivated(&mut self, cfg: &SimConfig, rng: &mut Pcg32) -> Vec<DestroyedRing> {
        let mut destroyed = Vec::new();
        for i in 0..self.rings.len() {
            if self.rings[i].state != RingState::JustDeactivated {
                continue;
            }
            let old = DestroyedRing {
                center: self.rings[i].center,
                radius: self.rings[i].radius,
                color: self.rings[i].color,
            };
            destroyed.push(old);

            if cfg.regenerate {
                let radius = self.replacement_radius(i, cfg, rng);
                let speed = rng.random_range(cfg.spin_min..=cfg.spin_max);
                let spin = if rng.random_bool(0.5) { speed } else { -speed };
                let color = rng.random_range(0..RING_PALETTE);
                log::info!(
                    "ring escaped at r={:.0}, replacement spawned at r={:.0}",
                    old.radius,
                    radius
                );
                self.rings[i] = Ring::new(
                    self.center,
                    radius,
                    rng.random_range(0.0..360.0),
                    spin,
                    color,
                    cfg,
                );
            } else {
                log::info!("ring escaped at r={:.0}", old.radius);
                self.rings[i].state = RingState::Inactive;
            }
        }
        destroyed
    }

    /// Pick a replacement radius clear of every surviving ring.
    ///
    /// Tries a bounded number of candidates in the preferred band, then
    /// falls back to the off-screen radius, which only becomes visible as it
    /// shrinks. Bounded, so provably terminating.
    fn replacement_radius(&self, skip: usize, cfg: &SimConfig, rng: &mut Pcg32) -> f32 {
        for _ in 0..cfg.replace_attempts {
            let candidate = rng.random_range(cfg.replace_min_radius..=cfg.replace_max_radius);
            let clear = self.rings.iter().enumerate().all(|(j, r)| {
                j == skip || !r.is_active() || (r.radius - candidate).abs() >= cfg.replace_margin
            });
            if clear {
                return candidate;
            }
        }
        cfg.offscreen_radius
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct SimState {
    /// Construction config, reused by the reset commands
    pub cfg: SimConfig,
    /// Runtime-mutable knobs
    pub physics: Physics,
    pub ball: Ball,
    pub rings: RingSet,
    /// Cosmetic shockwaves from destroyed rings
    pub effects: Vec<Shockwave>,
    pub paused: bool,
    /// Seconds simulated so far
    pub elapsed: f32,
    /// Frames stepped so far
    pub frames: u64,
    pub rng: Pcg32,
}

impl SimState {
    /// Validate the config and build the initial state
    pub fn new(cfg: SimConfig) -> Result<Self> {
        cfg.validate()?;
        let mut rng = Pcg32::seed_from_u64(cfg.seed);
        let ball = Ball::spawn(&cfg, &mut rng);
        let rings = RingSet::standard(&cfg, &mut rng);
        Ok(Self {
            physics: Physics::from_config(&cfg),
            ball,
            rings,
            effects: Vec::new(),
            paused: false,
            elapsed: 0.0,
            frames: 0,
            rng,
            cfg,
        })
    }

    /// Respawn the ball at the configured spawn point
    pub fn reset_ball(&mut self) {
        self.ball = Ball::spawn(&self.cfg, &mut self.rng);
    }

    /// Rebuild the standard ring layout, fresh radii and spins included
    pub fn reset_rings(&mut self) {
        self.rings = RingSet::standard(&self.cfg, &mut self.rng);
    }
}
