//! Fixed-step simulation engine.
//!
//! Drives the per-tick pipeline: admission, transient-boost reset and
//! arbitration, policy selection, DVFS governance and energy accounting,
//! resource acquisition or blocking, execution, and wait accounting. The
//! whole run is a pure, bounded computation over `total_time + 1` ticks;
//! for fixed inputs every decision and log line is fully determined.

use serde::Serialize;
use tracing::{debug, info};

use crate::cpu::{self, CpuPowerState};
use crate::policy::Discipline;
use crate::resource::{self, ResourceTable};
use crate::scenario::{BlockPolicy, Scenario};
use crate::stats::{Metrics, TaskOutcome};
use crate::task::{normalize, SimTask};
use crate::trace::{TimelineSlot, Trace, TraceKind};
use crate::types::Tick;

/// Complete output of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Discipline that produced this run.
    pub scheduler: &'static str,
    /// Final per-task outcome records, in input order.
    pub tasks: Vec<TaskOutcome>,
    /// Chronological human-readable trace lines.
    pub log: Vec<String>,
    /// One snapshot per iterated tick.
    pub timeline: Vec<TimelineSlot>,
    pub metrics: Metrics,
    /// Structured events behind the log, for programmatic inspection.
    #[serde(skip)]
    pub trace: Trace,
}

/// The simulator: a discipline applied to caller-owned scenarios.
///
/// Runs share no state; independent runs may execute in parallel on
/// separate threads.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    discipline: Discipline,
}

impl Simulator {
    pub fn new(discipline: Discipline) -> Self {
        Simulator { discipline }
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Run a scenario to completion and return the result bundle.
    pub fn run(&self, scenario: Scenario) -> SimulationResult {
        let Scenario {
            tasks: defs,
            total_time,
            laxity_threshold,
            block_policy,
        } = scenario;

        let mut tasks = normalize(&defs);
        let mut table = ResourceTable::new();
        let mut trace = Trace::default();
        let mut busy_ticks: u64 = 0;
        let mut total_energy: f64 = 0.0;

        info!(
            scheduler = self.discipline.name(),
            tasks = tasks.len(),
            total_time,
            "starting simulation"
        );

        for now in 0..=total_time {
            self.admit(&mut tasks, &mut table, &mut trace, now);

            // Transient boosts are recomputed from scratch each tick.
            for t in tasks.iter_mut() {
                t.boosted = false;
            }
            for boost in resource::apply_boosts(&mut tasks, &table) {
                trace.record(
                    now,
                    TraceKind::Boosted {
                        owner: tasks[boost.owner].id.clone(),
                        waiter: tasks[boost.waiter].id.clone(),
                        resource: boost.resource,
                    },
                );
            }

            // Selection over the full candidate set.
            let candidates = runnable(&tasks, &[]);
            let pick = self
                .discipline
                .select(&tasks, &candidates, SimTask::effectively_critical);

            // The DVFS decision follows the pick, before block discovery;
            // its power draw accrues whether or not anything runs.
            let state = self.power_state(pick.map(|i| &tasks[i]), now, laxity_threshold);
            total_energy += state.power();

            // Resource arbitration on the picked task.
            let running = self.resolve_resources(
                pick,
                &mut tasks,
                &mut table,
                &mut trace,
                now,
                block_policy,
            );

            if let Some(idx) = running {
                self.execute(&mut tasks[idx], &mut table, &mut trace, now, state);
                busy_ticks += 1;
            } else {
                trace.record(now, TraceKind::Idle);
            }

            // Every ready, non-completed, non-running task waited this
            // tick, blocked picks included (charged exactly once).
            for (i, t) in tasks.iter_mut().enumerate() {
                if Some(i) != running && t.is_ready() {
                    t.wait_time += 1;
                }
            }

            trace.snapshot(now, running.map(|i| tasks[i].id.clone()), state);

            let all_arrived = tasks.iter().all(|t| t.admitted);
            let all_done = tasks.iter().all(|t| t.completed);
            if all_arrived && all_done {
                debug!(tick = now, "all tasks complete, ending run early");
                break;
            }
        }

        let metrics = Metrics::compute(&tasks, total_time, busy_ticks, total_energy);
        SimulationResult {
            scheduler: self.discipline.name(),
            tasks: tasks.iter().map(TaskOutcome::from_task).collect(),
            log: trace.log_lines(),
            timeline: trace.timeline().to_vec(),
            metrics,
            trace,
        }
    }

    /// Admit arrived tasks. A declared holder takes its resource on
    /// admission so contention is visible before the holder first runs.
    fn admit(&self, tasks: &mut [SimTask], table: &mut ResourceTable, trace: &mut Trace, now: Tick) {
        for t in tasks.iter_mut() {
            if t.admitted || t.arrival > now as f64 {
                continue;
            }
            t.admitted = true;
            trace.record(now, TraceKind::Admitted { id: t.id.clone() });
            if let Some(held) = t.holds_resource.clone() {
                if table.owner(&held).is_none() {
                    table.acquire(&held, &t.id);
                    trace.record(
                        now,
                        TraceKind::Acquired {
                            id: t.id.clone(),
                            resource: held,
                        },
                    );
                }
            }
        }
    }

    fn power_state(
        &self,
        selected: Option<&SimTask>,
        now: Tick,
        laxity_threshold: f64,
    ) -> CpuPowerState {
        match self.discipline {
            Discipline::EnergyHybrid => cpu::pick_power_state(selected, now, laxity_threshold),
            _ => CpuPowerState::High,
        }
    }

    /// Decide who actually runs, given the policy's pick.
    ///
    /// A pick blocked on a foreign-owned resource idles the entire tick
    /// under [`BlockPolicy::IdleTick`]; no other candidate is tried.
    /// [`BlockPolicy::Reselect`] retries among the remaining candidates
    /// instead.
    fn resolve_resources(
        &self,
        pick: Option<usize>,
        tasks: &mut [SimTask],
        table: &mut ResourceTable,
        trace: &mut Trace,
        now: Tick,
        block_policy: BlockPolicy,
    ) -> Option<usize> {
        let mut excluded: Vec<usize> = Vec::new();
        let mut pick = pick;

        loop {
            let idx = pick?;
            let id = tasks[idx].id.clone();

            if let Some(res) = tasks[idx].needs_resource.clone() {
                match table.owner(&res).map(str::to_owned) {
                    Some(owner) if owner != id => {
                        debug!(task = %id, resource = %res, owner = %owner, "pick blocked");
                        trace.record(
                            now,
                            TraceKind::Blocked {
                                id,
                                resource: res,
                                owner,
                            },
                        );
                        match block_policy {
                            BlockPolicy::IdleTick => return None,
                            BlockPolicy::Reselect => {
                                excluded.push(idx);
                                let candidates = runnable(tasks, &excluded);
                                pick = self.discipline.select(
                                    tasks,
                                    &candidates,
                                    SimTask::effectively_critical,
                                );
                                continue;
                            }
                        }
                    }
                    Some(_) => {} // already ours
                    None => {
                        table.acquire(&res, &id);
                        trace.record(
                            now,
                            TraceKind::Acquired {
                                id: id.clone(),
                                resource: res,
                            },
                        );
                    }
                }
            }

            // Confirm the declared holding as well.
            if let Some(held) = tasks[idx].holds_resource.clone() {
                if table.owner(&held).is_none() {
                    table.acquire(&held, &id);
                    trace.record(
                        now,
                        TraceKind::Acquired { id, resource: held },
                    );
                }
            }

            return Some(idx);
        }
    }

    /// One tick of execution for the chosen task.
    fn execute(
        &self,
        task: &mut SimTask,
        table: &mut ResourceTable,
        trace: &mut Trace,
        now: Tick,
        state: CpuPowerState,
    ) {
        let speed = state.speed();
        task.record_run(now);
        task.remaining = (task.remaining - speed).max(0.0);
        trace.record(
            now,
            TraceKind::Ran {
                id: task.id.clone(),
                speed,
                remaining: task.remaining,
            },
        );

        if task.is_done() && !task.completed {
            task.completed = true;
            task.completion_time = Some(now + 1);
            trace.record(
                now,
                TraceKind::Completed {
                    id: task.id.clone(),
                    at: now + 1,
                },
            );
            for res in [task.holds_resource.clone(), task.needs_resource.clone()]
                .into_iter()
                .flatten()
            {
                if table.release(&res, &task.id) {
                    trace.record(
                        now,
                        TraceKind::Released {
                            id: task.id.clone(),
                            resource: res,
                        },
                    );
                }
            }
        }
    }
}

/// Indices of selectable tasks: ready, work left, not excluded.
fn runnable(tasks: &[SimTask], excluded: &[usize]) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|&(i, t)| t.is_candidate() && !excluded.contains(&i))
        .map(|(i, _)| i)
        .collect()
}
