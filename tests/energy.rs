//! DVFS governance and energy accounting.

use rtsim::{workload, Discipline, Scenario, Simulator, TaskDef};

mod common;

fn power_of(state: &str) -> f64 {
    match state {
        "HIGH" => 10.0,
        "LOW" => 3.0,
        other => panic!("unexpected cpu state {other}"),
    }
}

/// Energy is exactly the sum over ticks of the chosen state's power.
#[test]
fn test_energy_matches_timeline() {
    common::setup_test();
    for discipline in Discipline::ALL {
        let result = Simulator::new(discipline)
            .run(Scenario::builder().tasks(workload::mixed_periodic()).build());
        let expected: f64 = result
            .timeline
            .iter()
            .map(|slot| power_of(slot.cpu_state))
            .sum();
        assert_eq!(
            result.metrics.total_energy,
            expected,
            "{} energy mismatch",
            discipline.name()
        );
    }
}

/// Non-energy disciplines pin the CPU at HIGH, busy or idle.
#[test]
fn test_fixed_disciplines_stay_high() {
    common::setup_test();
    let result = Simulator::new(Discipline::Rms).run(
        Scenario::builder()
            .task(TaskDef::new("late", 4.0, 3.0).with_period(10.0))
            .build(),
    );
    assert!(result.timeline.iter().all(|s| s.cpu_state == "HIGH"));
    // 4 idle ticks + 3 run ticks, all at power 10.
    assert_eq!(result.metrics.total_energy, 70.0);
}

/// Energy-hybrid: idle ticks drop to LOW, tight laxity forces HIGH.
#[test]
fn test_energy_hybrid_idle_and_tight() {
    common::setup_test();
    let result = Simulator::new(Discipline::EnergyHybrid).run(
        Scenario::builder()
            .task(TaskDef::new("tight", 3.0, 2.0).with_deadline(4.0))
            .build(),
    );
    let states: Vec<&str> = result.timeline.iter().map(|s| s.cpu_state).collect();
    // Idle ticks 0-2 power-save; laxity at tick 3 is 7 - (3 + 2) = 2,
    // well under the threshold, so the task runs at full speed.
    assert_eq!(states, ["LOW", "LOW", "LOW", "HIGH", "HIGH"]);
    assert_eq!(result.metrics.total_energy, 3.0 * 3.0 + 2.0 * 10.0);
    assert_eq!(result.tasks[0].completion_time, Some(5));
}

/// Ample laxity lets the governor run slow: half speed, so twice the
/// ticks, at less than a third the power.
#[test]
fn test_energy_hybrid_exploits_slack() {
    common::setup_test();
    let result = Simulator::new(Discipline::EnergyHybrid)
        .run(Scenario::builder().tasks(workload::slack()).build());
    assert!(result.timeline.iter().all(|s| s.cpu_state == "LOW"));
    // 10 work units at speed 0.5 = 20 ticks each, back to back.
    assert_eq!(result.tasks[0].completion_time, Some(20));
    assert_eq!(result.tasks[1].completion_time, Some(40));
    assert_eq!(result.metrics.total_energy, 40.0 * 3.0);
    assert_eq!(result.metrics.deadline_miss_ratio, 0.0);
}

/// On an always-busy task set, energy-hybrid never exceeds the energy of
/// the same set forced to HIGH every tick.
#[test]
fn test_energy_hybrid_beats_forced_high() {
    common::setup_test();
    let busy = || {
        Scenario::builder()
            .task(TaskDef::new("grind-a", 0.0, 1000.0).with_deadline(10000.0))
            .task(TaskDef::new("grind-b", 0.0, 1000.0).with_deadline(10000.0))
            .total_time(50)
            .build()
    };
    let eco = Simulator::new(Discipline::EnergyHybrid).run(busy());
    let forced = Simulator::new(Discipline::Hybrid).run(busy());
    // Identical selection, identical horizon; only the governor differs.
    assert_eq!(eco.timeline.len(), forced.timeline.len());
    assert!(eco.metrics.total_energy <= forced.metrics.total_energy);
    assert_eq!(forced.metrics.total_energy, 51.0 * 10.0);
}
