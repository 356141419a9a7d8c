//! Resource ownership and the priority-inheritance estimator.
//!
//! Resources are single-owner mutual-exclusion slots keyed by name. The
//! estimator is a heuristic, not a correctness-preserving protocol: once
//! per tick, a waiter that outranks the current owner of its needed
//! resource marks that owner boosted for this tick only. One hop, no
//! transitive propagation, no queueing.

use std::collections::BTreeMap;

use crate::task::SimTask;

/// Maps resource name to owning task id. A resource has at most one owner
/// at any tick; entries are created on acquisition and removed only by the
/// owner. BTreeMap keeps any iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    owners: BTreeMap<String, String>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current owner of a resource, if any.
    pub fn owner(&self, resource: &str) -> Option<&str> {
        self.owners.get(resource).map(String::as_str)
    }

    /// Record ownership. Callers check for conflicts first; acquiring an
    /// already-owned resource overwrites nothing it shouldn't because the
    /// engine never calls this while another owner exists.
    pub fn acquire(&mut self, resource: &str, task_id: &str) {
        self.owners
            .insert(resource.to_string(), task_id.to_string());
    }

    /// Remove an entry, but only if `task_id` is the owner. Returns whether
    /// a release happened.
    pub fn release(&mut self, resource: &str, task_id: &str) -> bool {
        if self.owner(resource) == Some(task_id) {
            self.owners.remove(resource);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Priority score used by the inheritance estimator: effectively-critical
/// tasks sit a million points above everyone else; within a band, a nearer
/// deadline scores higher.
pub fn priority_score(task: &SimTask) -> f64 {
    let base = if task.effectively_critical() {
        1_000_000.0
    } else {
        0.0
    };
    base - task.abs_deadline
}

/// A boost applied during one arbitration pass, reported for tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostRecord {
    /// Index of the boosted owner.
    pub owner: usize,
    /// Index of the outranking waiter.
    pub waiter: usize,
    pub resource: String,
}

/// One arbitration pass over the task set.
///
/// For every ready waiter whose needed resource is held by a different
/// task, boost the owner if the waiter outranks it. Boosts set earlier in
/// the same pass count as criticality for later comparisons within the
/// tick; the engine clears all flags before calling this.
pub fn apply_boosts(tasks: &mut [SimTask], table: &ResourceTable) -> Vec<BoostRecord> {
    let mut boosts = Vec::new();

    for waiter in 0..tasks.len() {
        if !tasks[waiter].is_ready() {
            continue;
        }
        let Some(resource) = tasks[waiter].needs_resource.clone() else {
            continue;
        };
        let Some(owner_id) = table.owner(&resource) else {
            continue;
        };
        if owner_id == tasks[waiter].id {
            continue;
        }
        let Some(owner) = tasks.iter().position(|t| t.id == owner_id) else {
            continue;
        };

        if priority_score(&tasks[waiter]) > priority_score(&tasks[owner]) && !tasks[owner].boosted
        {
            tasks[owner].boosted = true;
            boosts.push(BoostRecord {
                owner,
                waiter,
                resource,
            });
        }
    }

    boosts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{normalize, TaskDef};

    fn ready(mut tasks: Vec<SimTask>) -> Vec<SimTask> {
        for t in &mut tasks {
            t.admitted = true;
        }
        tasks
    }

    #[test]
    fn test_single_owner_per_resource() {
        let mut table = ResourceTable::new();
        table.acquire("R1", "a");
        assert_eq!(table.owner("R1"), Some("a"));
        assert_eq!(table.len(), 1);

        // Only the owner can release.
        assert!(!table.release("R1", "b"));
        assert_eq!(table.owner("R1"), Some("a"));
        assert!(table.release("R1", "a"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_critical_outranks_any_deadline() {
        let tasks = ready(normalize(&[
            TaskDef::new("near", 0.0, 1.0).with_deadline(1.0),
            TaskDef::new("crit", 0.0, 1.0).with_deadline(1e6).critical(),
        ]));
        assert!(priority_score(&tasks[1]) > priority_score(&tasks[0]));
    }

    #[test]
    fn test_critical_waiter_boosts_owner() {
        let mut tasks = ready(normalize(&[
            TaskDef::new("holder", 0.0, 12.0).with_deadline(50.0).holds("R1"),
            TaskDef::new("waiter", 0.0, 5.0).critical().needs("R1"),
        ]));
        let mut table = ResourceTable::new();
        table.acquire("R1", "holder");

        let boosts = apply_boosts(&mut tasks, &table);
        assert_eq!(
            boosts,
            vec![BoostRecord {
                owner: 0,
                waiter: 1,
                resource: "R1".into()
            }]
        );
        assert!(tasks[0].boosted);
        assert!(!tasks[1].boosted);
    }

    #[test]
    fn test_lowly_waiter_boosts_nothing() {
        let mut tasks = ready(normalize(&[
            TaskDef::new("holder", 0.0, 12.0).with_deadline(5.0).holds("R1"),
            TaskDef::new("waiter", 0.0, 5.0).with_deadline(100.0).needs("R1"),
        ]));
        let mut table = ResourceTable::new();
        table.acquire("R1", "holder");

        assert!(apply_boosts(&mut tasks, &table).is_empty());
        assert!(!tasks[0].boosted);
    }

    #[test]
    fn test_no_boost_without_contention() {
        // Waiter already owns the resource it needs.
        let mut tasks = ready(normalize(&[TaskDef::new("solo", 0.0, 3.0).needs("R1")]));
        let mut table = ResourceTable::new();
        table.acquire("R1", "solo");
        assert!(apply_boosts(&mut tasks, &table).is_empty());
    }
}
