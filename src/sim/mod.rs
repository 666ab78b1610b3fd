//! The simulation core
//!
//! Synchronous and frame-stepped: one [`step`] call per rendered frame, fed
//! the wall-clock delta and the frame's external commands. No rendering or
//! platform dependencies; presentation reads the state as plain data.

pub mod ring;
pub mod state;
pub mod step;

pub use ring::{Ring, RingState, reflect};
pub use state::{Ball, DestroyedRing, Physics, RingSet, Shockwave, SimState, TrailPoint};
pub use step::{Command, step};
