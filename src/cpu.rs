//! CPU power states and the DVFS governor.
//!
//! The processor runs at one of two voltage/frequency operating points,
//! chosen once per tick. Speed scales the work consumed by the running
//! task; power accrues into the energy total every tick, running or idle.

use std::fmt;

use crate::task::SimTask;
use crate::types::Tick;

/// A CPU voltage/frequency operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuPowerState {
    /// Full speed: 1.0 work units per tick, 10 power per tick.
    High,
    /// Power-save: 0.5 work units per tick, 3 power per tick.
    Low,
}

impl CpuPowerState {
    /// Work units consumed per tick while a task runs in this state.
    pub fn speed(self) -> f64 {
        match self {
            CpuPowerState::High => 1.0,
            CpuPowerState::Low => 0.5,
        }
    }

    /// Power drawn per tick, whether running or idle.
    pub fn power(self) -> f64 {
        match self {
            CpuPowerState::High => 10.0,
            CpuPowerState::Low => 3.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CpuPowerState::High => "HIGH",
            CpuPowerState::Low => "LOW",
        }
    }
}

impl fmt::Display for CpuPowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slack between a task's absolute deadline and its earliest possible
/// completion at full speed. Remaining work is taken as-is, not
/// speed-adjusted.
pub fn laxity(task: &SimTask, now: Tick) -> f64 {
    task.abs_deadline - (now as f64 + task.remaining)
}

/// DVFS governor decision for the energy-hybrid discipline.
///
/// An idle tick drops to LOW. A selected task with more laxity than the
/// threshold can afford to run slow; anything tighter gets full speed.
pub fn pick_power_state(
    selected: Option<&SimTask>,
    now: Tick,
    laxity_threshold: f64,
) -> CpuPowerState {
    match selected {
        None => CpuPowerState::Low,
        Some(task) if laxity(task, now) > laxity_threshold => CpuPowerState::Low,
        Some(_) => CpuPowerState::High,
    }
}
