use ndarray::{array, Array1};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::convert::TryFrom;
use std::fmt;

use crate::error::JunctionError;

pub type IntersectionId = usize;

/// Vehicles added to the red direction per step are drawn from `0..MAX_RED_GROWTH`.
const MAX_RED_GROWTH: u32 = 3;
/// Green service capacity per step is `BASE_SERVICE + uniform(0..SERVICE_JITTER)`.
const BASE_SERVICE: u32 = 3;
const SERVICE_JITTER: u32 = 3;

/// Which approach currently has the green signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NsGreen,
    EwGreen,
}

impl Phase {
    pub fn index(self) -> usize {
        match self {
            Phase::NsGreen => 0,
            Phase::EwGreen => 1,
        }
    }

    pub fn toggled(self) -> Phase {
        match self {
            Phase::NsGreen => Phase::EwGreen,
            Phase::EwGreen => Phase::NsGreen,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NsGreen => write!(f, "NS Green, EW Red"),
            Phase::EwGreen => write!(f, "NS Red, EW Green"),
        }
    }
}

/// The four signal commands an agent can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalAction {
    /// Keep the current phase
    Keep,
    /// Switch to the other phase
    Toggle,
    /// Give NS the green, switching only if it is not green already
    ForceNsGreen,
    /// Give EW the green, switching only if it is not green already
    ForceEwGreen,
}

impl SignalAction {
    pub const COUNT: usize = 4;
    pub const ALL: [SignalAction; SignalAction::COUNT] = [
        SignalAction::Keep,
        SignalAction::Toggle,
        SignalAction::ForceNsGreen,
        SignalAction::ForceEwGreen,
    ];

    pub fn index(self) -> usize {
        match self {
            SignalAction::Keep => 0,
            SignalAction::Toggle => 1,
            SignalAction::ForceNsGreen => 2,
            SignalAction::ForceEwGreen => 3,
        }
    }

    /// Phase after applying this action to `current`.
    pub fn next_phase(self, current: Phase) -> Phase {
        match self {
            SignalAction::Keep => current,
            SignalAction::Toggle => current.toggled(),
            SignalAction::ForceNsGreen => Phase::NsGreen,
            SignalAction::ForceEwGreen => Phase::EwGreen,
        }
    }
}

impl TryFrom<usize> for SignalAction {
    type Error = JunctionError;

    fn try_from(code: usize) -> Result<Self, Self::Error> {
        SignalAction::ALL
            .get(code)
            .copied()
            .ok_or(JunctionError::InvalidAction {
                action: code,
                max_actions: SignalAction::COUNT,
            })
    }
}

/// Grid coordinate of an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// Read-only snapshot reported alongside each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionInfo {
    pub queue_ns: u32,
    pub queue_ew: u32,
    pub phase: Phase,
    pub time_in_phase: u32,
}

/// A signalised intersection with one queue per approach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    id: IntersectionId,
    position: GridPosition,
    pub(crate) queue_ns: u32,
    pub(crate) queue_ew: u32,
    pub(crate) phase: Phase,
    pub(crate) time_in_phase: u32,
}

impl Intersection {
    pub fn new(id: IntersectionId, position: GridPosition) -> Self {
        Intersection {
            id,
            position,
            queue_ns: 0,
            queue_ew: 0,
            phase: Phase::NsGreen,
            time_in_phase: 0,
        }
    }

    pub fn id(&self) -> IntersectionId {
        self.id
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn queue_ns(&self) -> u32 {
        self.queue_ns
    }

    pub fn queue_ew(&self) -> u32 {
        self.queue_ew
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_in_phase(&self) -> u32 {
        self.time_in_phase
    }

    pub fn total_queue(&self) -> u32 {
        self.queue_ns + self.queue_ew
    }

    /// Random queues in `0..10`, NS green, timer cleared.
    pub(crate) fn reset<R: Rng + ?Sized>(&mut self, queue_cap: u32, rng: &mut R) {
        self.queue_ns = rng.gen_range(0..10).min(queue_cap);
        self.queue_ew = rng.gen_range(0..10).min(queue_cap);
        self.phase = Phase::NsGreen;
        self.time_in_phase = 0;
    }

    /// Apply `action`, returning whether the phase changed.
    pub(crate) fn apply_action(&mut self, action: SignalAction) -> bool {
        let next = action.next_phase(self.phase);
        let switched = next != self.phase;
        if switched {
            self.phase = next;
            self.time_in_phase = 0;
        }
        switched
    }

    /// Serve the green approach and grow the red one for one step, then advance the timer.
    pub(crate) fn advance_flow<R: Rng + ?Sized>(&mut self, queue_cap: u32, rng: &mut R) {
        let (green, red) = match self.phase {
            Phase::NsGreen => (&mut self.queue_ns, &mut self.queue_ew),
            Phase::EwGreen => (&mut self.queue_ew, &mut self.queue_ns),
        };
        let service = BASE_SERVICE + rng.gen_range(0..SERVICE_JITTER);
        *green -= service.min(*green);
        add_vehicles(red, rng.gen_range(0..MAX_RED_GROWTH), queue_cap);
        self.time_in_phase += 1;
    }

    /// `[queue_ns, queue_ew, phase, time_in_phase, sin(2πt/24), cos(2πt/24)]`
    pub fn observation(&self, hour: f64) -> Array1<f32> {
        let angle = 2.0 * std::f64::consts::PI * hour / 24.0;
        array![
            self.queue_ns as f32,
            self.queue_ew as f32,
            self.phase.index() as f32,
            self.time_in_phase as f32,
            angle.sin() as f32,
            angle.cos() as f32
        ]
    }

    pub fn info(&self) -> IntersectionInfo {
        IntersectionInfo {
            queue_ns: self.queue_ns,
            queue_ew: self.queue_ew,
            phase: self.phase,
            time_in_phase: self.time_in_phase,
        }
    }
}

/// Add `amount` vehicles to `queue`, saturating at `cap`.
pub(crate) fn add_vehicles(queue: &mut u32, amount: u32, cap: u32) {
    *queue = queue.saturating_add(amount).min(cap);
}
