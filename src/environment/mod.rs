//! # Traffic Signal Environment
//!
//! A small grid of intersections, each with a North-South and an East-West queue
//! and a two-phase signal. Time advances five minutes per step and wraps at
//! midnight; arrivals follow a time-of-day profile (busier during the morning and
//! evening rush, quieter at night).
//!
//! ## Step order
//!
//! 1. Advance the step counter and the clock.
//! 2. Apply random arrivals to every intersection, independent of the actions.
//! 3. For each intersection that received an action: apply it, serve the green
//!    approach, grow the red approach, advance the phase timer and compute the
//!    reward `-(queue_ns + queue_ew + switch_penalty)`.
//! 4. Report the terminal flag, shared by all intersections.
//!
//! Queues are clamped to `[0, queue_cap]` at every update.

mod intersection;
mod traffic;

pub use intersection::{
    GridPosition, Intersection, IntersectionId, IntersectionInfo, Phase, SignalAction,
};
pub use traffic::{
    grid_positions, traffic_multiplier, Observation, Observations, StepOutcome,
    TrafficEnvironment, HOURS_PER_DAY, OBSERVATION_SIZE, STEP_HOURS, SWITCH_PENALTY,
};
