//! rtsim - Deterministic tick-stepped real-time scheduler simulator.
//!
//! Given tasks with arrival times, execution costs, deadlines, optional
//! periods, criticality flags, and single-slot mutual-exclusion resource
//! usage, the simulator replays tick by tick the decisions a real-time
//! scheduler would make under one of four disciplines and emits an
//! execution trace plus aggregate metrics.
//!
//! # Architecture
//!
//! - **Normalizer**: coerces raw descriptors into canonical task records
//! - **Arbiter**: resource ownership and per-tick priority-inheritance boosts
//! - **Policy**: pure selection function per discipline (RMS, EDF, hybrids)
//! - **Governor**: DVFS speed/power decision for the energy-hybrid mode
//! - **Engine**: the fixed-step loop tying the pieces together
//! - **Aggregator**: post-loop reduction into summary metrics
//!
//! Runs are pure and self-contained: a [`Scenario`] is consumed by value,
//! so repeated or parallel runs never observe each other's mutations, and
//! identical inputs produce byte-identical logs and metrics.
//!
//! # Usage
//!
//! ```
//! use rtsim::{Discipline, Scenario, Simulator, TaskDef};
//!
//! let scenario = Scenario::builder()
//!     .task(TaskDef::new("render", 0.0, 12.0).with_period(40.0).with_deadline(40.0))
//!     .task(TaskDef::new("telemetry", 2.0, 6.0).with_deadline(10.0).critical())
//!     .total_time(100)
//!     .build();
//!
//! let result = Simulator::new(Discipline::Hybrid).run(scenario);
//! assert!(result.tasks.iter().all(|t| t.completed));
//! assert_eq!(result.metrics.deadline_miss_ratio, 0.0);
//! ```

pub mod cpu;
pub mod engine;
pub mod policy;
pub mod resource;
pub mod scenario;
pub mod stats;
pub mod task;
pub mod trace;
pub mod types;
pub mod workload;

pub use cpu::{laxity, pick_power_state, CpuPowerState};
pub use engine::{SimulationResult, Simulator};
pub use policy::Discipline;
pub use resource::{apply_boosts, priority_score, BoostRecord, ResourceTable};
pub use scenario::{
    BlockPolicy, Scenario, ScenarioBuilder, DEFAULT_LAXITY_THRESHOLD, DEFAULT_TOTAL_TIME,
};
pub use stats::{Metrics, TaskOutcome};
pub use task::{normalize, RunSegment, SimTask, TaskDef};
pub use trace::{TimelineSlot, Trace, TraceEvent, TraceKind};
pub use types::{Period, Tick, EPSILON};
