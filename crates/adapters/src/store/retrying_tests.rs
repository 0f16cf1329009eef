// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::{FakeStore, StoreCall};
use std::time::Duration;

fn retrying(store: &FakeStore) -> RetryingStore<FakeStore> {
    RetryingStore::new(store.clone(), Backoff::constant(Duration::from_secs(1)))
}

#[tokio::test(start_paused = true)]
async fn throttled_calls_are_retried_transparently() {
    let fake = FakeStore::new();
    fake.insert(ProjectRecord::idle("alpha"));
    fake.throttle_next(3);
    let store = retrying(&fake);
    let start = tokio::time::Instant::now();

    let record = store.get("alpha").await.unwrap();

    assert_eq!(record, Some(ProjectRecord::idle("alpha")));
    assert_eq!(fake.count_calls(|c| matches!(c, StoreCall::Get { .. })), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn condition_failures_are_not_retried() {
    let fake = FakeStore::new();
    fake.insert(ProjectRecord::idle("alpha").with_state(ProjectState::Active));
    let store = retrying(&fake);

    let result = store
        .set_state("alpha", StateGuard::Is(ProjectState::Idle), ProjectState::Active)
        .await;

    assert_eq!(result, Err(StoreError::ConditionFailed));
    assert_eq!(
        fake.count_calls(|c| matches!(c, StoreCall::SetState { .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn backend_errors_propagate_immediately() {
    let fake = FakeStore::new();
    fake.fail_next(StoreError::Backend("ValidationException".to_string()));
    let store = retrying(&fake);

    let result = store.add_waiting("alpha", "deploy", AddMode::Always).await;

    assert_eq!(
        result,
        Err(StoreError::Backend("ValidationException".to_string()))
    );
    assert_eq!(fake.record("alpha"), None);
}

#[tokio::test(start_paused = true)]
async fn bounded_policy_surfaces_throttling() {
    let fake = FakeStore::new();
    fake.throttle_next(10);
    let store = RetryingStore::new(
        fake.clone(),
        Backoff::constant(Duration::from_millis(100)).with_max_attempts(2),
    );

    let result = store.remove_waiting("alpha", "deploy").await;

    assert!(result.unwrap_err().is_throttled());
    assert_eq!(
        fake.count_calls(|c| matches!(c, StoreCall::RemoveWaiting { .. })),
        2
    );
}

fn interrupt_after(delay: Duration) -> Interrupt {
    let (trigger, interrupt) = sz_core::interrupt_channel();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.trigger();
    });
    interrupt
}

#[tokio::test(start_paused = true)]
async fn interruptible_handle_stops_retrying_throttled_calls() {
    let fake = FakeStore::new();
    fake.throttle_next(u32::MAX);
    let store = retrying(&fake).interruptible(&interrupt_after(Duration::from_millis(1500)));
    let start = tokio::time::Instant::now();

    let result = store.get("alpha").await;

    assert_eq!(result, Err(StoreError::Interrupted));
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
    assert_eq!(fake.count_calls(|c| matches!(c, StoreCall::Get { .. })), 2);
}

#[tokio::test(start_paused = true)]
async fn plain_handle_keeps_retrying_after_interrupt() {
    let fake = FakeStore::new();
    fake.insert(ProjectRecord::idle("alpha").with_state(ProjectState::Active));
    let (trigger, interrupt) = sz_core::interrupt_channel();
    trigger.trigger();
    let store = retrying(&fake);
    let _interruptible = store.interruptible(&interrupt);
    fake.throttle_next(3);

    let result = store
        .set_state(
            "alpha",
            StateGuard::IsNot(ProjectState::Blocked),
            ProjectState::Idle,
        )
        .await;

    assert_eq!(result, Ok(()));
    assert_eq!(fake.record("alpha").unwrap().state, ProjectState::Idle);
}
