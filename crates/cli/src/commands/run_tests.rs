// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::EXIT_USAGE;
use yare::parameterized;

fn args(project: Option<&str>, playbook: Option<&str>) -> RunArgs {
    RunArgs {
        project: project.map(str::to_string),
        playbook: playbook.map(str::to_string),
    }
}

#[test]
fn resolves_both_values() {
    let (project, playbook) = args(Some("alpha"), Some("deploy.yml")).resolve().unwrap();
    assert_eq!(project, "alpha");
    assert_eq!(playbook, "deploy.yml");
}

#[parameterized(
    no_project = { None, Some("deploy.yml"), "--project" },
    blank_project = { Some("  "), Some("deploy.yml"), "--project" },
    no_playbook = { Some("alpha"), None, "--playbook" },
    blank_playbook = { Some("alpha"), Some(""), "--playbook" },
)]
fn missing_values_are_usage_errors(project: Option<&str>, playbook: Option<&str>, flag: &str) {
    let err = args(project, playbook).resolve().unwrap_err();
    assert_eq!(err.exit_code, EXIT_USAGE);
    assert_eq!(err.message, format!("missing {}", flag));
}
