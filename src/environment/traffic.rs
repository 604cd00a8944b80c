use ndarray::Array1;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::EnvironmentConfig;
use crate::error::{JunctionError, Result};
use super::intersection::{
    add_vehicles, GridPosition, Intersection, IntersectionId, IntersectionInfo, SignalAction,
};

/// Length of every observation vector.
pub const OBSERVATION_SIZE: usize = 6;
/// Simulated time per step: five minutes.
pub const STEP_HOURS: f64 = 5.0 / 60.0;
pub const HOURS_PER_DAY: f64 = 24.0;
/// Extra reward penalty on a step whose action changed the phase.
pub const SWITCH_PENALTY: f32 = 3.0;

const BASE_ARRIVAL_PROBABILITY: f64 = 0.4;

pub type Observation = Array1<f32>;
pub type Observations = BTreeMap<IntersectionId, Observation>;

/// Result of one environment step. Maps are keyed by intersection id in ascending order.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub observations: Observations,
    /// Only intersections that received an action this step have a reward.
    pub rewards: BTreeMap<IntersectionId, f32>,
    pub terminal: bool,
    pub info: BTreeMap<IntersectionId, IntersectionInfo>,
}

/// Time-of-day arrival multiplier: rush hours 1.5, night 0.3, otherwise 1.0.
pub fn traffic_multiplier(hour: f64) -> f64 {
    if (7.0..9.0).contains(&hour) || (16.0..19.0).contains(&hour) {
        1.5
    } else if hour >= 22.0 || hour < 5.0 {
        0.3
    } else {
        1.0
    }
}

/// Evenly spread `count` intersections over a `rows x cols` grid, row-major.
///
/// `count` must be a perfect square: positions are the integer-truncated points of
/// `linspace(0, rows - 1, √count)` crossed with the same over the columns.
pub fn grid_positions(grid_size: (usize, usize), count: usize) -> Result<Vec<GridPosition>> {
    let (rows, cols) = grid_size;
    if rows == 0 || cols == 0 {
        return Err(JunctionError::InvalidConfig(format!(
            "grid size {}x{} has no cells",
            rows, cols
        )));
    }
    let side = integer_sqrt(count).ok_or_else(|| {
        JunctionError::InvalidConfig(format!(
            "num_intersections = {} has no integer square root",
            count
        ))
    })?;
    if side == 0 {
        return Err(JunctionError::InvalidConfig("num_intersections must be positive".to_string()));
    }

    let row_positions = linspace_truncated(rows - 1, side);
    let col_positions = linspace_truncated(cols - 1, side);
    Ok(row_positions
        .iter()
        .flat_map(|&row| col_positions.iter().map(move |&col| GridPosition { row, col }))
        .collect())
}

fn integer_sqrt(n: usize) -> Option<usize> {
    let root = (n as f64).sqrt().round() as usize;
    (root * root == n).then(|| root)
}

fn linspace_truncated(stop: usize, count: usize) -> Vec<usize> {
    if count == 1 {
        return vec![0];
    }
    let step = stop as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| if i == count - 1 { stop } else { (i as f64 * step) as usize })
        .collect()
}

/// Discrete-time simulation of a grid of signalised intersections.
///
/// Each step advances the clock by five minutes, applies time-of-day shaped random
/// arrivals to every intersection, then applies the supplied signal actions. All
/// randomness comes from the generator passed to [`TrafficEnvironment::reset`] and
/// [`TrafficEnvironment::step`].
#[derive(Clone, Debug)]
pub struct TrafficEnvironment {
    config: EnvironmentConfig,
    intersections: Vec<Intersection>,
    simulated_time: f64,
    step_count: usize,
}

impl TrafficEnvironment {
    pub fn new(config: EnvironmentConfig) -> Result<Self> {
        config.validate()?;
        let intersections = grid_positions(config.grid_size, config.num_intersections)?
            .into_iter()
            .enumerate()
            .map(|(id, position)| Intersection::new(id, position))
            .collect();

        Ok(TrafficEnvironment {
            config,
            intersections,
            simulated_time: 0.0,
            step_count: 0,
        })
    }

    /// Start a new episode and return the initial observations.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Observations {
        self.simulated_time = 0.0;
        self.step_count = 0;
        let queue_cap = self.config.queue_cap;
        for intersection in &mut self.intersections {
            intersection.reset(queue_cap, rng);
        }
        self.observe()
    }

    pub fn observe(&self) -> Observations {
        self.intersections
            .iter()
            .map(|ix| (ix.id(), ix.observation(self.simulated_time)))
            .collect()
    }

    /// Advance one step, applying `actions`. Ids without an intersection are ignored.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        actions: &BTreeMap<IntersectionId, SignalAction>,
        rng: &mut R,
    ) -> StepOutcome {
        self.step_count += 1;
        self.simulated_time = (self.simulated_time + STEP_HOURS).rem_euclid(HOURS_PER_DAY);

        self.apply_arrivals(rng);

        let queue_cap = self.config.queue_cap;
        let mut rewards = BTreeMap::new();
        let mut info = BTreeMap::new();
        for (&id, &action) in actions {
            let intersection = match self.intersections.get_mut(id) {
                Some(intersection) => intersection,
                None => continue,
            };

            let switched = intersection.apply_action(action);
            intersection.advance_flow(queue_cap, rng);

            let penalty = if switched { SWITCH_PENALTY } else { 0.0 };
            rewards.insert(id, -(intersection.total_queue() as f32 + penalty));
            info.insert(id, intersection.info());
        }

        StepOutcome {
            observations: self.observe(),
            rewards,
            terminal: self.is_terminal(),
            info,
        }
    }

    /// Random arrivals on both approaches of every intersection.
    ///
    /// One random factor in `[0.5, 1.5)` is drawn per intersection; each approach then
    /// receives `1..=3` vehicles with probability `0.4 * multiplier * factor`.
    fn apply_arrivals<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let multiplier = traffic_multiplier(self.simulated_time);
        let queue_cap = self.config.queue_cap;
        for intersection in &mut self.intersections {
            let factor = rng.gen_range(0.5..1.5);
            let probability = BASE_ARRIVAL_PROBABILITY * multiplier * factor;
            if rng.gen::<f64>() < probability {
                add_vehicles(&mut intersection.queue_ns, rng.gen_range(1..4), queue_cap);
            }
            if rng.gen::<f64>() < probability {
                add_vehicles(&mut intersection.queue_ew, rng.gen_range(1..4), queue_cap);
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.step_count >= self.config.max_steps
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(id)
    }

    pub(crate) fn intersection_mut(&mut self, id: IntersectionId) -> Option<&mut Intersection> {
        self.intersections.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.intersections.iter().map(Intersection::id)
    }

    pub fn num_intersections(&self) -> usize {
        self.intersections.len()
    }

    /// Simulated hour of day in `[0, 24)`.
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Set the clock, wrapping into `[0, 24)`.
    pub fn set_simulated_time(&mut self, hours: f64) {
        self.simulated_time = hours.rem_euclid(HOURS_PER_DAY);
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn max_steps(&self) -> usize {
        self.config.max_steps
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }
}

impl fmt::Display for TrafficEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {:.2} hours", self.simulated_time)?;
        writeln!(f, "Step: {}/{}", self.step_count, self.config.max_steps)?;
        for ix in &self.intersections {
            let position = ix.position();
            writeln!(f, "Intersection {}: Position ({}, {})", ix.id(), position.row, position.col)?;
            writeln!(f, "  Phase: {} (for {} steps)", ix.phase(), ix.time_in_phase())?;
            writeln!(f, "  NS Queue: {}", ix.queue_ns())?;
            writeln!(f, "  EW Queue: {}", ix.queue_ew())?;
        }
        Ok(())
    }
}
