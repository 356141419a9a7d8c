//! Task model: raw descriptors, the normalizer, and runtime task state.
//!
//! Raw descriptors arrive from JSON or programmatic construction with any
//! numeric field possibly missing or malformed. The normalizer is total:
//! it coerces bad values to documented defaults and always produces exactly
//! one canonical [`SimTask`] per descriptor, preserving input order.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Period, Tick, EPSILON};

/// A raw task descriptor as supplied by a workload file or caller.
///
/// Numeric fields tolerate junk: missing, null, or non-numeric values fall
/// back to 0 or the field's documented default instead of failing the
/// parse. Numbers quoted as strings are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDef {
    /// Unique task identifier.
    pub id: String,
    /// Tick at which the task becomes ready (clamped to >= 0).
    #[serde(deserialize_with = "lenient_f64")]
    pub arrival: f64,
    /// Total work units the task must execute.
    #[serde(deserialize_with = "lenient_f64")]
    pub execution: f64,
    /// Relative deadline; defaults to `execution` when absent or invalid.
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub deadline: Option<f64>,
    /// Period in ticks; absent or non-positive means aperiodic. Used only
    /// as an RMS sort key, never to regenerate jobs.
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub period: Option<f64>,
    /// Criticality flag consumed by the hybrid disciplines.
    #[serde(alias = "isCritical")]
    pub is_critical: bool,
    /// Resource this task owns for its lifetime (at most one).
    #[serde(alias = "holdsResource")]
    pub holds_resource: Option<String>,
    /// Resource this task must hold to run (at most one).
    #[serde(alias = "needsResource")]
    pub needs_resource: Option<String>,
}

impl TaskDef {
    pub fn new(id: impl Into<String>, arrival: f64, execution: f64) -> Self {
        TaskDef {
            id: id.into(),
            arrival,
            execution,
            ..Default::default()
        }
    }

    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn holds(mut self, resource: impl Into<String>) -> Self {
        self.holds_resource = Some(resource.into());
        self
    }

    pub fn needs(mut self, resource: impl Into<String>) -> Self {
        self.needs_resource = Some(resource.into());
        self
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(coerce_f64(&Value::deserialize(de)?).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(coerce_f64(&Value::deserialize(de)?))
}

/// A contiguous span of ticks during which one task occupied the processor.
/// `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSegment {
    pub start: Tick,
    pub end: Tick,
}

/// A task in canonical form with its mutable run state.
///
/// Lifecycle: Pending until `arrival <= now`, then Ready until completed or
/// the simulation ends. Tasks are retained through metrics aggregation and
/// never destroyed mid-run.
#[derive(Debug, Clone)]
pub struct SimTask {
    pub id: String,
    pub arrival: f64,
    pub execution: f64,
    /// `arrival + relative deadline`.
    pub abs_deadline: f64,
    pub period: Period,
    pub is_critical: bool,
    pub holds_resource: Option<String>,
    pub needs_resource: Option<String>,

    /// Work left; non-increasing, decremented only while running.
    pub remaining: f64,
    pub admitted: bool,
    pub completed: bool,
    /// One past the tick ending the final run segment.
    pub completion_time: Option<Tick>,
    /// Accumulated idle-while-ready ticks.
    pub wait_time: u64,
    /// Run segments in chronological order, contiguous spans merged.
    pub history: Vec<RunSegment>,
    /// Transient priority-inheritance flag, cleared and recomputed every
    /// tick. Never persists across ticks.
    pub boosted: bool,
}

impl SimTask {
    /// Canonicalize one raw descriptor. Total: never fails.
    pub fn from_def(def: &TaskDef) -> Self {
        let arrival = if def.arrival.is_finite() {
            def.arrival.max(0.0)
        } else {
            0.0
        };
        let execution = if def.execution.is_finite() && def.execution > 0.0 {
            def.execution
        } else {
            0.0
        };
        let deadline = match def.deadline {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => execution,
        };

        SimTask {
            id: def.id.clone(),
            arrival,
            execution,
            abs_deadline: arrival + deadline,
            period: Period::from_raw(def.period),
            is_critical: def.is_critical,
            holds_resource: def.holds_resource.clone(),
            needs_resource: def.needs_resource.clone(),
            remaining: execution,
            admitted: false,
            completed: false,
            completion_time: None,
            wait_time: 0,
            history: Vec::new(),
            boosted: false,
        }
    }

    /// Ready: admitted and not yet completed.
    pub fn is_ready(&self) -> bool {
        self.admitted && !self.completed
    }

    /// Eligible for selection: ready with work left.
    pub fn is_candidate(&self) -> bool {
        self.is_ready() && self.remaining > 0.0
    }

    /// Criticality as seen by the hybrid disciplines this tick.
    pub fn effectively_critical(&self) -> bool {
        self.is_critical || self.boosted
    }

    /// Whether the remaining work counts as done.
    pub fn is_done(&self) -> bool {
        self.remaining <= EPSILON
    }

    /// Record one tick of execution in the history: extend the trailing
    /// segment if contiguous, otherwise open a new one.
    pub fn record_run(&mut self, now: Tick) {
        match self.history.last_mut() {
            Some(seg) if seg.end == now => seg.end = now + 1,
            _ => self.history.push(RunSegment {
                start: now,
                end: now + 1,
            }),
        }
    }
}

/// Convert raw descriptors into canonical tasks, preserving input order.
pub fn normalize(defs: &[TaskDef]) -> Vec<SimTask> {
    defs.iter().map(SimTask::from_def).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_defaults_to_execution() {
        let t = SimTask::from_def(&TaskDef::new("a", 5.0, 8.0));
        assert_eq!(t.abs_deadline, 13.0);
        assert_eq!(t.remaining, 8.0);
    }

    #[test]
    fn test_negative_arrival_clamps_to_zero() {
        let t = SimTask::from_def(&TaskDef::new("a", -7.0, 3.0).with_deadline(4.0));
        assert_eq!(t.arrival, 0.0);
        assert_eq!(t.abs_deadline, 4.0);
    }

    #[test]
    fn test_missing_period_is_aperiodic() {
        let t = SimTask::from_def(&TaskDef::new("a", 0.0, 1.0));
        assert_eq!(t.period, Period::Aperiodic);
        let p = SimTask::from_def(&TaskDef::new("b", 0.0, 1.0).with_period(40.0));
        assert!(p.period < t.period);
    }

    #[test]
    fn test_lenient_json_coercion() {
        // Quoted numbers parse, junk coerces to defaults, missing fields
        // take struct defaults.
        let json = r#"{
            "id": "messy",
            "arrival": "3",
            "execution": {"not": "a number"},
            "deadline": null,
            "period": "oops",
            "isCritical": true
        }"#;
        let def: TaskDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.arrival, 3.0);
        assert_eq!(def.execution, 0.0);
        assert_eq!(def.deadline, None);
        assert_eq!(def.period, None);
        assert!(def.is_critical);

        let t = SimTask::from_def(&def);
        assert_eq!(t.abs_deadline, 3.0);
        assert_eq!(t.period, Period::Aperiodic);
    }

    #[test]
    fn test_normalize_preserves_order() {
        let defs = vec![
            TaskDef::new("z", 0.0, 1.0),
            TaskDef::new("a", 0.0, 1.0),
            TaskDef::new("m", 0.0, 1.0),
        ];
        let ids: Vec<_> = normalize(&defs).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn test_history_merges_contiguous_runs() {
        let mut t = SimTask::from_def(&TaskDef::new("a", 0.0, 5.0));
        t.record_run(0);
        t.record_run(1);
        t.record_run(4);
        assert_eq!(
            t.history,
            vec![
                RunSegment { start: 0, end: 2 },
                RunSegment { start: 4, end: 5 }
            ]
        );
    }
}
