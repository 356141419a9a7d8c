//! Post-run metrics aggregation.
//!
//! Runs once after the tick loop: reduces final task state plus the
//! engine's running counters into the aggregate metrics bundle. All
//! ratios and averages are defined for the empty task set.

use serde::Serialize;

use crate::task::{RunSegment, SimTask};
use crate::types::Tick;

/// Final per-task outcome record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub id: String,
    pub arrival: f64,
    pub execution: f64,
    pub abs_deadline: f64,
    pub completed: bool,
    pub completion_time: Option<Tick>,
    pub wait_time: u64,
    pub history: Vec<RunSegment>,
}

impl TaskOutcome {
    pub fn from_task(task: &SimTask) -> Self {
        TaskOutcome {
            id: task.id.clone(),
            arrival: task.arrival,
            execution: task.execution,
            abs_deadline: task.abs_deadline,
            completed: task.completed,
            completion_time: task.completion_time,
            wait_time: task.wait_time,
            history: task.history.clone(),
        }
    }

    /// Missed: never completed, or completed past the absolute deadline.
    pub fn missed_deadline(&self) -> bool {
        self.completion_time
            .map_or(true, |c| c as f64 > self.abs_deadline)
    }
}

/// Aggregate performance metrics for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Sum over ticks of the chosen CPU state's power draw.
    pub total_energy: f64,
    /// Fraction of tasks that missed their deadline, in [0, 1].
    pub deadline_miss_ratio: f64,
    /// Mean of `completion_time - arrival`; uncompleted tasks count as
    /// `total_time - arrival`.
    pub avg_turnaround: f64,
    /// `busy_ticks / max(total_sim_time, 1)`.
    pub cpu_utilization: f64,
    /// Latest completion time, floored at the configured horizon.
    pub total_sim_time: Tick,
    /// Ticks during which a task actually executed.
    pub cpu_busy_time: u64,
}

impl Metrics {
    pub fn compute(
        tasks: &[SimTask],
        total_time: Tick,
        busy_ticks: u64,
        total_energy: f64,
    ) -> Self {
        let total_sim_time = tasks
            .iter()
            .filter_map(|t| t.completion_time)
            .max()
            .map_or(total_time, |latest| latest.max(total_time));

        let n = tasks.len();
        let misses = tasks
            .iter()
            .filter(|t| t.completion_time.map_or(true, |c| c as f64 > t.abs_deadline))
            .count();
        let deadline_miss_ratio = if n == 0 {
            0.0
        } else {
            misses as f64 / n as f64
        };

        let avg_turnaround = if n == 0 {
            0.0
        } else {
            tasks
                .iter()
                .map(|t| match t.completion_time {
                    Some(c) => c as f64 - t.arrival,
                    None => total_time as f64 - t.arrival,
                })
                .sum::<f64>()
                / n as f64
        };

        Metrics {
            total_energy,
            deadline_miss_ratio,
            avg_turnaround,
            cpu_utilization: busy_ticks as f64 / total_sim_time.max(1) as f64,
            total_sim_time,
            cpu_busy_time: busy_ticks,
        }
    }

    /// Print a summary report to stderr.
    pub fn print_summary(&self) {
        eprintln!("\n=== Run Summary ===");
        eprintln!("  total sim time:   {} ticks", self.total_sim_time);
        eprintln!("  cpu busy time:    {} ticks", self.cpu_busy_time);
        eprintln!("  cpu utilization:  {:.1}%", self.cpu_utilization * 100.0);
        eprintln!(
            "  deadline misses:  {:.1}%",
            self.deadline_miss_ratio * 100.0
        );
        eprintln!("  avg turnaround:   {:.2} ticks", self.avg_turnaround);
        eprintln!("  total energy:     {:.1}", self.total_energy);
        eprintln!();
    }
}
