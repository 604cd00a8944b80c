use serde::{Serialize, Deserialize};

use crate::error::{JunctionError, Result};

/// Multiplicative epsilon decay with a floor.
///
/// `value` never increases and never drops below `min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    value: f32,
    min: f32,
    decay: f32,
}

impl EpsilonSchedule {
    pub fn new(start: f32, min: f32, decay: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&start) {
            return Err(JunctionError::invalid_parameter("epsilon_start", "must be within [0, 1]"));
        }
        if !(0.0..=start).contains(&min) {
            return Err(JunctionError::invalid_parameter("epsilon_min", "must be within [0, epsilon_start]"));
        }
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(JunctionError::invalid_parameter("epsilon_decay", "must be within (0, 1]"));
        }
        Ok(EpsilonSchedule { value: start, min, decay })
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// `value <- max(min, value * decay)`
    pub fn decay_step(&mut self) {
        self.value = (self.value * self.decay).max(self.min);
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        EpsilonSchedule { value: 1.0, min: 0.01, decay: 0.995 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hundred_decays() {
        let mut schedule = EpsilonSchedule::default();
        for _ in 0..100 {
            schedule.decay_step();
        }
        assert!((schedule.value() - 0.995f32.powi(100)).abs() < 1e-4);
        assert!((schedule.value() - 0.606).abs() < 1e-3);
    }

    #[test]
    fn test_floor_holds() {
        let mut schedule = EpsilonSchedule::new(0.02, 0.01, 0.5).unwrap();
        schedule.decay_step();
        assert_eq!(schedule.value(), 0.01);
        schedule.decay_step();
        assert_eq!(schedule.value(), 0.01);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(EpsilonSchedule::new(1.5, 0.01, 0.995).is_err());
        assert!(EpsilonSchedule::new(0.5, 0.6, 0.995).is_err());
        assert!(EpsilonSchedule::new(1.0, 0.01, 0.0).is_err());
        assert!(EpsilonSchedule::new(1.0, 0.01, 1.2).is_err());
    }
}
