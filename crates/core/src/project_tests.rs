// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn new_record_is_idle_and_not_waiting() {
    let record = ProjectRecord::idle("alpha");
    assert_eq!(record.project, "alpha");
    assert_eq!(record.state, ProjectState::Idle);
    assert!(record.waiting.is_empty());
}

#[parameterized(
    idle = { ProjectState::Idle, Decision::Activate },
    active = { ProjectState::Active, Decision::StillActive },
    blocked = { ProjectState::Blocked, Decision::Blocked },
)]
fn decision_follows_state(state: ProjectState, expected: Decision) {
    let record = ProjectRecord::idle("alpha").with_state(state);
    assert_eq!(record.decide(), expected);
}

#[test]
fn waiting_membership_does_not_affect_decision() {
    let record = ProjectRecord::idle("alpha").with_waiting("deploy");
    assert!(record.is_waiting("deploy"));
    assert!(!record.is_waiting("rollback"));
    assert_eq!(record.decide(), Decision::Activate);
}

#[parameterized(
    idle = { "idle", ProjectState::Idle },
    active = { "active", ProjectState::Active },
    blocked = { "blocked", ProjectState::Blocked },
)]
fn state_parses_wire_value(raw: &str, expected: ProjectState) {
    assert_eq!(raw.parse::<ProjectState>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[test]
fn unknown_state_is_rejected() {
    let err = "paused".parse::<ProjectState>().unwrap_err();
    assert_eq!(err.to_string(), "unknown project state: paused");
}

#[test]
fn observed_exposes_record_either_way() {
    let found = Observed::Found(ProjectRecord::idle("a").with_state(ProjectState::Active));
    let created = Observed::Created(ProjectRecord::idle("b"));

    assert!(!found.was_created());
    assert!(created.was_created());
    assert_eq!(found.record().state, ProjectState::Active);
    assert_eq!(created.into_record().project, "b");
}

#[test]
fn record_serializes_with_lowercase_state() {
    let record = ProjectRecord::idle("alpha")
        .with_state(ProjectState::Blocked)
        .with_waiting("deploy");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["state"], "blocked");
    assert_eq!(json["waiting"][0], "deploy");
}
