//! Scheduling disciplines and the shared selection routine.
//!
//! All four disciplines funnel through one `select` entry point sharing
//! identical tie-breaks, parameterized by an effective-criticality
//! predicate so the hybrid disciplines see per-tick priority boosts
//! without the policies knowing where boosts come from.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use tracing::warn;

use crate::task::SimTask;

/// A scheduling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Discipline {
    /// Rate-Monotonic: smaller period wins; aperiodic always loses.
    Rms,
    /// Earliest-Deadline-First: nearer absolute deadline wins.
    #[default]
    Edf,
    /// Criticality-aware: RMS over the effectively-critical subset when
    /// one exists, otherwise EDF over everyone.
    Hybrid,
    /// Same selection as Hybrid, with the DVFS governor active.
    EnergyHybrid,
}

impl Discipline {
    pub const ALL: [Discipline; 4] = [
        Discipline::Rms,
        Discipline::Edf,
        Discipline::Hybrid,
        Discipline::EnergyHybrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Discipline::Rms => "rms",
            Discipline::Edf => "edf",
            Discipline::Hybrid => "hybrid",
            Discipline::EnergyHybrid => "energy-hybrid",
        }
    }

    /// Parse a discipline name. Unrecognized names fall back to EDF
    /// rather than failing the run.
    pub fn parse_lenient(name: &str) -> Self {
        match name {
            "rms" => Discipline::Rms,
            "edf" => Discipline::Edf,
            "hybrid" => Discipline::Hybrid,
            "energy-hybrid" => Discipline::EnergyHybrid,
            other => {
                warn!(scheduler = other, "unknown scheduler name, using edf");
                Discipline::Edf
            }
        }
    }

    /// Pick the next task to run among `candidates` (indices into
    /// `tasks`), or `None` to idle.
    ///
    /// Tie-breaks are shared by every discipline: smaller primary key
    /// wins, then smaller arrival, then lexicographically smaller id.
    pub fn select(
        self,
        tasks: &[SimTask],
        candidates: &[usize],
        is_critical: impl Fn(&SimTask) -> bool,
    ) -> Option<usize> {
        match self {
            Discipline::Rms => min_by_rms(tasks, candidates),
            Discipline::Edf => min_by_edf(tasks, candidates),
            Discipline::Hybrid | Discipline::EnergyHybrid => {
                let critical: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| is_critical(&tasks[i]))
                    .collect();
                if critical.is_empty() {
                    min_by_edf(tasks, candidates)
                } else {
                    min_by_rms(tasks, &critical)
                }
            }
        }
    }
}

fn tie_break(a: &SimTask, b: &SimTask) -> Ordering {
    OrderedFloat(a.arrival)
        .cmp(&OrderedFloat(b.arrival))
        .then_with(|| a.id.cmp(&b.id))
}

fn min_by_rms(tasks: &[SimTask], candidates: &[usize]) -> Option<usize> {
    candidates.iter().copied().min_by(|&a, &b| {
        tasks[a]
            .period
            .cmp(&tasks[b].period)
            .then_with(|| tie_break(&tasks[a], &tasks[b]))
    })
}

fn min_by_edf(tasks: &[SimTask], candidates: &[usize]) -> Option<usize> {
    candidates.iter().copied().min_by(|&a, &b| {
        OrderedFloat(tasks[a].abs_deadline)
            .cmp(&OrderedFloat(tasks[b].abs_deadline))
            .then_with(|| tie_break(&tasks[a], &tasks[b]))
    })
}
