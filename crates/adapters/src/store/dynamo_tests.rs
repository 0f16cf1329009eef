// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use aws_sdk_dynamodb::error::ErrorMetadata;
use yare::parameterized;

fn sdk_error(code: &str) -> ErrorMetadata {
    ErrorMetadata::builder()
        .code(code)
        .message("request rejected")
        .build()
}

#[parameterized(
    provisioned = { "ProvisionedThroughputExceededException" },
    throttling = { "ThrottlingException" },
    request_limit = { "RequestLimitExceeded" },
)]
fn throughput_codes_are_throttled(code: &str) {
    let error = classify(sdk_error(code));
    assert_eq!(
        error,
        StoreError::Throttled(format!("{code}: request rejected"))
    );
}

#[test]
fn conditional_check_is_condition_failed() {
    let error = classify(sdk_error("ConditionalCheckFailedException"));
    assert_eq!(error, StoreError::ConditionFailed);
}

#[test]
fn other_codes_are_backend_errors() {
    let error = classify(sdk_error("ValidationException"));
    assert_eq!(
        error,
        StoreError::Backend("ValidationException: request rejected".to_string())
    );
}

fn item(pairs: Vec<(&str, AttributeValue)>) -> HashMap<String, AttributeValue> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[test]
fn decode_full_record() {
    let record = decode(
        "alpha",
        &item(vec![
            ("project", AttributeValue::S("alpha".to_string())),
            ("state", AttributeValue::S("active".to_string())),
            (
                "waiting",
                AttributeValue::Ss(vec!["deploy".to_string(), "rollback".to_string()]),
            ),
        ]),
    )
    .unwrap();

    assert_eq!(
        record,
        ProjectRecord::idle("alpha")
            .with_state(ProjectState::Active)
            .with_waiting("deploy")
            .with_waiting("rollback")
    );
}

#[test]
fn decode_missing_attributes_as_idle_and_empty() {
    let record = decode(
        "alpha",
        &item(vec![("project", AttributeValue::S("alpha".to_string()))]),
    )
    .unwrap();
    assert_eq!(record, ProjectRecord::idle("alpha"));
}

#[parameterized(
    unknown_state = { AttributeValue::S("paused".to_string()) },
    numeric_state = { AttributeValue::N("1".to_string()) },
)]
fn decode_rejects_bad_state(value: AttributeValue) {
    let result = decode("alpha", &item(vec![("state", value)]));
    assert!(matches!(
        result,
        Err(StoreError::Malformed { project, .. }) if project == "alpha"
    ));
}

#[test]
fn decode_rejects_non_set_waiting() {
    let result = decode(
        "alpha",
        &item(vec![("waiting", AttributeValue::S("deploy".to_string()))]),
    );
    assert!(matches!(result, Err(StoreError::Malformed { .. })));
}

#[test]
fn config_from_settings_carries_credentials() {
    let mut settings = SerializeConfig::default();
    settings.aws.access_key_id = Some("AKID".to_string());
    settings.aws.secret_access_key = Some("secret".to_string());
    settings.aws.endpoint_url = Some("http://localhost:8000".to_string());

    let config = DynamoStoreConfig::from_config(&settings);

    assert_eq!(config.table, "serialize-ansible");
    assert_eq!(config.region, "us-east-1");
    assert_eq!(
        config.credentials,
        Some(("AKID".to_string(), "secret".to_string()))
    );
    assert_eq!(config.read_capacity, 1);
    assert!(!format!("{config:?}").contains("secret"));
}

#[parameterized(
    activate = {
        StateGuard::Is(ProjectState::Idle),
        "attribute_not_exists(#state) OR #state = :guard",
        ProjectState::Idle,
    },
    expect_active = {
        StateGuard::Is(ProjectState::Active),
        "#state = :guard",
        ProjectState::Active,
    },
    anything_but_idle = {
        StateGuard::IsNot(ProjectState::Idle),
        "attribute_exists(#state) AND #state <> :guard",
        ProjectState::Idle,
    },
    release_unless_blocked = {
        StateGuard::IsNot(ProjectState::Blocked),
        "attribute_not_exists(#state) OR #state <> :guard",
        ProjectState::Blocked,
    },
)]
fn guard_conditions_treat_missing_state_as_idle(
    guard: StateGuard,
    expression: &str,
    operand: ProjectState,
) {
    assert_eq!(condition(guard), (expression, operand));
}

#[test]
fn every_guard_agrees_with_in_memory_evaluation_on_missing_state() {
    // A missing attribute must behave like a stored idle state
    for state in [ProjectState::Idle, ProjectState::Active, ProjectState::Blocked] {
        for guard in [StateGuard::Is(state), StateGuard::IsNot(state)] {
            let (expression, _) = condition(guard);
            let accepts_missing = expression.starts_with("attribute_not_exists(#state) OR");
            assert_eq!(
                accepts_missing,
                guard.holds(ProjectState::Idle),
                "{guard:?}"
            );
        }
    }
}
