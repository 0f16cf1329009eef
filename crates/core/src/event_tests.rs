// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn waiting() -> LockEvent {
    LockEvent::Waiting {
        project: "alpha".to_string(),
        job: "deploy".to_string(),
    }
}

#[test]
fn names_are_namespaced() {
    assert_eq!(waiting().name(), "lock:waiting");
    assert_eq!(
        LockEvent::Killed {
            job: "deploy".to_string()
        }
        .name(),
        "job:killed"
    );
}

#[test]
fn only_terminal_wait_events_end_the_wait() {
    assert!(!waiting().ends_wait());
    assert!(LockEvent::Activated {
        project: "alpha".to_string(),
        job: "deploy".to_string(),
    }
    .ends_wait());
    assert!(LockEvent::Blocked {
        project: "alpha".to_string(),
        job: "deploy".to_string(),
    }
    .ends_wait());
    assert!(!LockEvent::Deactivated {
        project: "alpha".to_string(),
    }
    .ends_wait());
}

#[test]
fn serializes_with_event_tag() {
    let json = serde_json::to_value(LockEvent::JobExited {
        job: "deploy".to_string(),
        exit_code: 2,
    })
    .unwrap();
    assert_eq!(json["event"], "job_exited");
    assert_eq!(json["exit_code"], 2);
}
