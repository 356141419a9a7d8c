//! Workload loading and canned sample task sets.
//!
//! The loader turns JSON task-descriptor files into [`TaskDef`] lists.
//! Parse failures are loader errors; malformed fields inside otherwise
//! valid descriptors are the normalizer's business and never fail here.
//! The canned sets are small archetypes for the CLI and tests.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::task::TaskDef;

/// Load task descriptors from a JSON file.
///
/// Accepts either a bare array of descriptors or an object with a
/// top-level `"tasks"` array.
pub fn load_tasks(path: &Path) -> Result<Vec<TaskDef>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read workload {}", path.display()))?;
    parse_tasks(&data).with_context(|| format!("failed to parse workload {}", path.display()))
}

/// Parse task descriptors from a JSON string.
pub fn parse_tasks(data: &str) -> Result<Vec<TaskDef>> {
    let value: Value = serde_json::from_str(data)?;
    let array = match &value {
        Value::Array(_) => value,
        Value::Object(map) => match map.get("tasks") {
            Some(tasks @ Value::Array(_)) => tasks.clone(),
            _ => bail!("expected a JSON array of tasks or an object with a \"tasks\" array"),
        },
        _ => bail!("expected a JSON array of tasks or an object with a \"tasks\" array"),
    };
    Ok(serde_json::from_value(array)?)
}

/// Mixed periodic/aperiodic set with one critical task: the default
/// demo workload. Light enough that EDF meets every deadline.
pub fn mixed_periodic() -> Vec<TaskDef> {
    vec![
        TaskDef::new("sensor", 0.0, 12.0).with_period(40.0).with_deadline(40.0),
        TaskDef::new("control", 0.0, 20.0).with_period(50.0).with_deadline(50.0),
        TaskDef::new("watchdog", 5.0, 4.0).with_deadline(15.0).critical(),
        TaskDef::new("logger", 10.0, 25.0).with_deadline(120.0),
    ]
}

/// Resource-contention archetype: a long-running holder, a critical
/// waiter on the same resource, and an unrelated bystander. Exercises
/// blocking and the priority-inheritance boost.
pub fn resource_contention() -> Vec<TaskDef> {
    vec![
        TaskDef::new("holder", 0.0, 12.0).with_deadline(60.0).holds("bus"),
        TaskDef::new("waiter", 2.0, 5.0).with_deadline(40.0).critical().needs("bus"),
        TaskDef::new("bystander", 0.0, 8.0).with_deadline(100.0),
    ]
}

/// Overload archetype: more demand than the horizon can serve, so some
/// deadlines must be missed under every discipline.
pub fn overload() -> Vec<TaskDef> {
    vec![
        TaskDef::new("burst-a", 0.0, 60.0).with_deadline(50.0),
        TaskDef::new("burst-b", 0.0, 60.0).with_deadline(55.0),
        TaskDef::new("burst-c", 10.0, 60.0).with_deadline(70.0),
    ]
}

/// Slack archetype: loose deadlines everywhere, so the energy-hybrid
/// governor can spend most of the run in the LOW state.
pub fn slack() -> Vec<TaskDef> {
    vec![
        TaskDef::new("lazy-a", 0.0, 10.0).with_deadline(150.0),
        TaskDef::new("lazy-b", 0.0, 10.0).with_deadline(180.0),
    ]
}

/// Look up a canned workload by name.
pub fn by_name(name: &str) -> Option<Vec<TaskDef>> {
    match name {
        "mixed-periodic" => Some(mixed_periodic()),
        "resource-contention" => Some(resource_contention()),
        "overload" => Some(overload()),
        "slack" => Some(slack()),
        _ => None,
    }
}

/// Names of all canned workloads, for CLI help.
pub const BUILTIN_NAMES: [&str; 4] = [
    "mixed-periodic",
    "resource-contention",
    "overload",
    "slack",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let defs = parse_tasks(r#"[{"id": "a", "arrival": 0, "execution": 5}]"#).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].id, "a");
        assert_eq!(defs[0].execution, 5.0);
    }

    #[test]
    fn test_parse_tasks_object() {
        let defs = parse_tasks(
            r#"{"tasks": [{"id": "a", "execution": 1}, {"id": "b", "execution": 2}]}"#,
        )
        .unwrap();
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn test_reject_non_task_json() {
        assert!(parse_tasks(r#""just a string""#).is_err());
        assert!(parse_tasks(r#"{"no_tasks": []}"#).is_err());
        assert!(parse_tasks("not json").is_err());
    }

    #[test]
    fn test_builtins_resolve() {
        for name in BUILTIN_NAMES {
            assert!(by_name(name).is_some(), "missing builtin {name}");
        }
        assert!(by_name("nope").is_none());
    }
}
