//! Scenario definition and builder API.
//!
//! A scenario bundles the task set with the run parameters. The engine
//! takes it by value: each run owns an isolated copy of the tasks, so
//! repeated or parallel runs never alias each other's mutations.

use crate::task::TaskDef;
use crate::types::Tick;

/// Default simulation horizon in ticks.
pub const DEFAULT_TOTAL_TIME: Tick = 200;

/// Default laxity threshold for the energy-hybrid DVFS governor.
pub const DEFAULT_LAXITY_THRESHOLD: f64 = 20.0;

/// What happens when the selected task is blocked on its resource.
///
/// The source behavior is `IdleTick`: a blocked pick idles the entire
/// tick with no reselection among the remaining candidates. `Reselect`
/// is an opt-in alternative, never the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockPolicy {
    /// A blocked pick wastes the whole tick (source-faithful).
    #[default]
    IdleTick,
    /// Retry selection among the remaining unblocked candidates.
    Reselect,
}

/// A complete run description: tasks plus parameters.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub tasks: Vec<TaskDef>,
    pub total_time: Tick,
    pub laxity_threshold: f64,
    pub block_policy: BlockPolicy,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }
}

/// Builder for [`Scenario`]. Invalid parameters substitute defaults
/// rather than failing.
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    tasks: Vec<TaskDef>,
    total_time: Tick,
    laxity_threshold: f64,
    block_policy: BlockPolicy,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        ScenarioBuilder {
            tasks: Vec::new(),
            total_time: DEFAULT_TOTAL_TIME,
            laxity_threshold: DEFAULT_LAXITY_THRESHOLD,
            block_policy: BlockPolicy::default(),
        }
    }
}

impl ScenarioBuilder {
    pub fn task(mut self, def: TaskDef) -> Self {
        self.tasks.push(def);
        self
    }

    pub fn tasks(mut self, defs: impl IntoIterator<Item = TaskDef>) -> Self {
        self.tasks.extend(defs);
        self
    }

    /// Simulation horizon. Zero falls back to the 200-tick default.
    pub fn total_time(mut self, ticks: Tick) -> Self {
        self.total_time = if ticks == 0 { DEFAULT_TOTAL_TIME } else { ticks };
        self
    }

    /// Laxity threshold for the energy-hybrid governor. Non-finite values
    /// fall back to the default of 20.
    pub fn laxity_threshold(mut self, threshold: f64) -> Self {
        self.laxity_threshold = if threshold.is_finite() {
            threshold
        } else {
            DEFAULT_LAXITY_THRESHOLD
        };
        self
    }

    pub fn block_policy(mut self, policy: BlockPolicy) -> Self {
        self.block_policy = policy;
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            tasks: self.tasks,
            total_time: self.total_time,
            laxity_threshold: self.laxity_threshold,
            block_policy: self.block_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let s = Scenario::builder().build();
        assert!(s.tasks.is_empty());
        assert_eq!(s.total_time, 200);
        assert_eq!(s.laxity_threshold, 20.0);
        assert_eq!(s.block_policy, BlockPolicy::IdleTick);
    }

    #[test]
    fn test_invalid_parameters_fall_back() {
        let s = Scenario::builder()
            .total_time(0)
            .laxity_threshold(f64::NAN)
            .build();
        assert_eq!(s.total_time, DEFAULT_TOTAL_TIME);
        assert_eq!(s.laxity_threshold, DEFAULT_LAXITY_THRESHOLD);
    }
}
