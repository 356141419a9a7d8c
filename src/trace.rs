//! Trace recording: per-tick events, rendered log lines, and timeline
//! snapshots.
//!
//! Every scheduling action (admission, boost, block, acquire, run,
//! completion, release, idle) is recorded as a [`TraceEvent`] with its
//! tick. The rendered log lines are byte-stable for identical inputs.

use std::fmt;

use serde::Serialize;

use crate::cpu::CpuPowerState;
use crate::types::Tick;

/// A single trace event produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub tick: Tick,
    pub kind: TraceKind,
}

/// The type of scheduling event recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceKind {
    /// A task arrived and became Ready.
    Admitted { id: String },
    /// A resource owner was boosted by an outranking waiter.
    Boosted {
        owner: String,
        waiter: String,
        resource: String,
    },
    /// The selected task could not take its needed resource; the whole
    /// tick goes idle under the default block policy.
    Blocked {
        id: String,
        resource: String,
        owner: String,
    },
    /// A task took ownership of a resource.
    Acquired { id: String, resource: String },
    /// A task executed for this tick.
    Ran {
        id: String,
        speed: f64,
        remaining: f64,
    },
    /// A task finished; effective completion time is `at`.
    Completed { id: String, at: Tick },
    /// A completed task gave up a resource.
    Released { id: String, resource: String },
    /// Nothing ran this tick.
    Idle,
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceKind::Admitted { id } => write!(f, "ADMIT    {id}"),
            TraceKind::Boosted {
                owner,
                waiter,
                resource,
            } => write!(f, "BOOST    {owner} (waiter {waiter} needs {resource})"),
            TraceKind::Blocked {
                id,
                resource,
                owner,
            } => write!(f, "BLOCK    {id} needs {resource} held by {owner}"),
            TraceKind::Acquired { id, resource } => write!(f, "ACQUIRE  {id} -> {resource}"),
            TraceKind::Ran {
                id,
                speed,
                remaining,
            } => write!(f, "RUN      {id} speed={speed} remaining={remaining:.1}"),
            TraceKind::Completed { id, at } => write!(f, "COMPLETE {id} at t={at}"),
            TraceKind::Released { id, resource } => write!(f, "RELEASE  {id} -> {resource}"),
            TraceKind::Idle => f.write_str("IDLE"),
        }
    }
}

/// One per-tick snapshot of who ran and at what power state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSlot {
    pub tick: Tick,
    /// Id of the running task, or `None` for an idle tick.
    pub running: Option<String>,
    pub cpu_state: &'static str,
}

/// A complete simulation trace: events in chronological order plus one
/// timeline slot per iterated tick.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
    timeline: Vec<TimelineSlot>,
}

impl Trace {
    pub(crate) fn record(&mut self, tick: Tick, kind: TraceKind) {
        self.events.push(TraceEvent { tick, kind });
    }

    pub(crate) fn snapshot(&mut self, tick: Tick, running: Option<String>, state: CpuPowerState) {
        self.timeline.push(TimelineSlot {
            tick,
            running,
            cpu_state: state.name(),
        });
    }

    /// All events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// One slot per iterated tick, including the final one.
    pub fn timeline(&self) -> &[TimelineSlot] {
        &self.timeline
    }

    /// Render the human-readable log. Deterministic for identical inputs.
    pub fn log_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| format!("[t={}] {}", e.tick, e.kind))
            .collect()
    }

    /// Pretty-print the trace to stderr for debugging.
    pub fn dump(&self) {
        for line in self.log_lines() {
            eprintln!("{line}");
        }
    }

    /// Number of ticks a task actually executed.
    pub fn run_count(&self, id: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(&e.kind, TraceKind::Ran { id: i, .. } if i == id))
            .count()
    }

    /// Number of ticks a task was selected but blocked on its resource.
    pub fn block_count(&self, id: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(&e.kind, TraceKind::Blocked { id: i, .. } if i == id))
            .count()
    }

    /// Number of ticks a task received a priority boost.
    pub fn boost_count(&self, owner: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(&e.kind, TraceKind::Boosted { owner: o, .. } if o == owner))
            .count()
    }

    /// Number of fully idle ticks.
    pub fn idle_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Idle))
            .count()
    }

    /// Tick at which a task was admitted, if it ever was.
    pub fn admitted_at(&self, id: &str) -> Option<Tick> {
        self.events.iter().find_map(|e| match &e.kind {
            TraceKind::Admitted { id: i } if i == id => Some(e.tick),
            _ => None,
        })
    }

    /// Effective completion time of a task, if it completed.
    pub fn completed_at(&self, id: &str) -> Option<Tick> {
        self.events.iter().find_map(|e| match &e.kind {
            TraceKind::Completed { id: i, at } if i == id => Some(*at),
            _ => None,
        })
    }
}
