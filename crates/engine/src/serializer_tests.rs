// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use sz_adapters::store::TableStatus;
use sz_adapters::{
    FakeJobRunner, FakeReporter, FakeStore, JobScript, ProcessCall, RetryingStore, StoreCall,
    StoreError,
};
use sz_core::{interrupt_channel, Backoff, ProjectRecord, ProjectState};
use tokio::time::Instant;

struct Harness {
    store: FakeStore,
    runner: FakeJobRunner,
    reporter: FakeReporter,
    serializer: Serializer<FakeStore, FakeJobRunner, FakeReporter>,
}

fn harness_with(config: SerializerConfig) -> Harness {
    let store = FakeStore::new();
    let runner = FakeJobRunner::new();
    let reporter = FakeReporter::new();
    let serializer = Serializer::new(
        SerializerDeps {
            store: store.clone(),
            runner: runner.clone(),
            reporter: reporter.clone(),
        },
        config,
    );
    Harness {
        store,
        runner,
        reporter,
        serializer,
    }
}

fn harness() -> Harness {
    harness_with(SerializerConfig::default())
}

fn interrupt_after(delay: Duration) -> Interrupt {
    let (trigger, interrupt) = interrupt_channel();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.trigger();
    });
    interrupt
}

fn assert_released(store: &FakeStore, project: &str) {
    let record = store.record(project).unwrap();
    assert_eq!(record.state, ProjectState::Idle, "project left {}", record.state);
    assert!(record.waiting.is_empty(), "waiting left {:?}", record.waiting);
}

// =============================================================================
// Normal paths
// =============================================================================

#[tokio::test]
async fn new_project_runs_job_and_returns_to_idle() {
    let h = harness();

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed { exit_code: 0 });
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(h.runner.started(), vec!["deploy.yml".to_string()]);
    assert_released(&h.store, "alpha");
    assert_eq!(
        h.reporter.names(),
        vec![
            "lock:waiting",
            "lock:polled",
            "lock:activated",
            "job:started",
            "job:exited",
            "lock:deactivated",
        ]
    );
}

#[tokio::test]
async fn job_failure_code_is_propagated_and_project_released() {
    let h = harness();
    h.runner.push(JobScript::exits(2));

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome.exit_code(), 2);
    assert_released(&h.store, "alpha");
}

#[tokio::test(start_paused = true)]
async fn waits_for_active_project_then_runs() {
    let h = harness();
    h.store.force_state("alpha", ProjectState::Active);
    let holder = h.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        holder.force_state("alpha", ProjectState::Idle);
    });

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed { exit_code: 0 });
    let polls = h
        .reporter
        .names()
        .into_iter()
        .filter(|n| *n == "lock:polled")
        .count();
    assert_eq!(polls, 5);
    assert_released(&h.store, "alpha");
}

#[tokio::test(start_paused = true)]
async fn concurrent_serializers_never_overlap() {
    let a = harness();
    let b_runner = FakeJobRunner::new();
    let b = Serializer::new(
        SerializerDeps {
            store: a.store.clone(),
            runner: b_runner.clone(),
            reporter: FakeReporter::new(),
        },
        SerializerConfig::default(),
    );
    for runner in [&a.runner, &b_runner] {
        runner.push(JobScript::Exit {
            after: Duration::from_secs(5),
            code: 0,
        });
    }
    let start = Instant::now();

    let never = Interrupt::never();
    let (first, second) = tokio::join!(
        a.serializer.serialize("alpha", "deploy.yml", &never),
        b.serialize("alpha", "rollback.yml", &never),
    );

    assert_eq!(first.unwrap(), Outcome::Completed { exit_code: 0 });
    assert_eq!(second.unwrap(), Outcome::Completed { exit_code: 0 });
    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_released(&a.store, "alpha");
}

#[tokio::test(start_paused = true)]
async fn throttled_store_calls_are_retried() {
    let store = FakeStore::new();
    store.throttle_next(3);
    let serializer = Serializer::new(
        SerializerDeps {
            store: RetryingStore::new(store.clone(), Backoff::default()),
            runner: FakeJobRunner::new(),
            reporter: FakeReporter::new(),
        },
        SerializerConfig::default(),
    );

    let outcome = serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed { exit_code: 0 });
    assert_released(&store, "alpha");
}

// =============================================================================
// Skips and refusals
// =============================================================================

#[tokio::test]
async fn blocked_project_never_launches_job() {
    let h = harness();
    h.store.insert(
        ProjectRecord::idle("alpha")
            .with_state(ProjectState::Blocked)
            .with_waiting("other.yml"),
    );

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Blocked);
    assert_eq!(outcome.exit_code(), 0);
    assert!(h.runner.started().is_empty());
    let record = h.store.record("alpha").unwrap();
    assert_eq!(record.state, ProjectState::Blocked);
    assert_eq!(
        record.waiting.into_iter().collect::<Vec<_>>(),
        vec!["other.yml".to_string()]
    );
    assert_eq!(h.reporter.names().last(), Some(&"lock:blocked"));
}

#[tokio::test]
async fn already_waiting_job_is_skipped_without_touching_the_entry() {
    let h = harness();
    h.store.insert(
        ProjectRecord::idle("alpha")
            .with_state(ProjectState::Active)
            .with_waiting("deploy.yml"),
    );

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Skipped(SkipReason::AlreadyWaiting));
    assert_eq!(outcome.exit_code(), 0);
    assert!(h.runner.started().is_empty());
    let record = h.store.record("alpha").unwrap();
    assert!(record.is_waiting("deploy.yml"));
    assert_eq!(record.state, ProjectState::Active);
    assert_eq!(h.reporter.names(), vec!["lock:already_waiting"]);
}

#[tokio::test(start_paused = true)]
async fn bounded_wait_times_out() {
    let h = harness_with(SerializerConfig {
        wait: WaitPolicy {
            poll_interval: Duration::from_secs(1),
            max_wait: Some(Duration::from_secs(5)),
        },
        ..SerializerConfig::default()
    });
    h.store.force_state("alpha", ProjectState::Active);

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::TimedOut);
    assert_eq!(outcome.exit_code(), EXIT_TIMED_OUT);
    assert!(h.runner.started().is_empty());
    let record = h.store.record("alpha").unwrap();
    assert_eq!(record.state, ProjectState::Active);
    assert!(record.waiting.is_empty());
}

// =============================================================================
// Interrupts and failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn interrupt_while_waiting_leaves_waiting_set() {
    let h = harness();
    h.store.force_state("alpha", ProjectState::Active);

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_secs(3)))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(outcome.exit_code(), EXIT_INTERRUPTED);
    let record = h.store.record("alpha").unwrap();
    assert_eq!(record.state, ProjectState::Active);
    assert!(record.waiting.is_empty());
    assert_eq!(h.reporter.names().last(), Some(&"serialize:interrupted"));
}

#[tokio::test(start_paused = true)]
async fn interrupt_mid_run_stops_job_and_releases() {
    let h = harness();
    h.runner.push(JobScript::Hang {
        honors_terminate: true,
    });

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_secs(30)))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert!(h
        .runner
        .calls()
        .contains(&ProcessCall::Terminate {
            job: "deploy.yml".to_string()
        }));
    assert_released(&h.store, "alpha");
    let names = h.reporter.names();
    assert_eq!(
        names[names.len() - 3..],
        ["job:terminate_requested", "lock:deactivated", "serialize:interrupted"]
    );
}

#[tokio::test(start_paused = true)]
async fn interrupt_against_stubborn_job_escalates_to_kill() {
    let h = harness();
    h.runner.push(JobScript::Hang {
        honors_terminate: false,
    });
    let start = Instant::now();

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_secs(1)))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    assert!(h.runner.calls().contains(&ProcessCall::Kill {
        job: "deploy.yml".to_string()
    }));
    assert_released(&h.store, "alpha");
}

#[tokio::test]
async fn launch_failure_still_releases_project() {
    let h = harness();
    h.runner.push(JobScript::LaunchFailure);

    let result = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await;

    assert!(matches!(result, Err(SerializeError::Process(_))));
    assert_released(&h.store, "alpha");
}

#[tokio::test(start_paused = true)]
async fn project_blocked_during_run_stays_blocked() {
    let h = harness();
    h.runner.push(JobScript::Exit {
        after: Duration::from_secs(10),
        code: 0,
    });
    let admin = h.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        admin.force_state("alpha", ProjectState::Blocked);
    });

    let outcome = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed { exit_code: 0 });
    assert_eq!(h.store.record("alpha").unwrap().state, ProjectState::Blocked);
}

#[tokio::test(start_paused = true)]
async fn release_failure_is_reported() {
    let h = harness();
    h.runner.push(JobScript::Exit {
        after: Duration::from_secs(10),
        code: 0,
    });
    let store = h.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        store.fail_next(StoreError::Backend("InternalServerError".to_string()));
    });

    let result = h
        .serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await;

    assert!(matches!(
        result,
        Err(SerializeError::Release { ref project, .. }) if project == "alpha"
    ));
    assert_eq!(h.store.record("alpha").unwrap().state, ProjectState::Active);
}

#[tokio::test]
async fn unexpected_table_status_is_fatal() {
    let h = harness();
    let store = FakeStore::new().with_table_statuses([TableStatus::Other("DELETING".to_string())]);
    let serializer = Serializer::new(
        SerializerDeps {
            store,
            runner: h.runner.clone(),
            reporter: h.reporter.clone(),
        },
        SerializerConfig::default(),
    );

    let result = serializer
        .serialize("alpha", "deploy.yml", &Interrupt::never())
        .await;

    assert!(matches!(
        result,
        Err(SerializeError::Store(StoreError::TableStatus(_)))
    ));
    assert!(h.runner.started().is_empty());
}

// =============================================================================
// Interrupts during store waits
// =============================================================================

fn retrying_serializer(
    store: &FakeStore,
    runner: &FakeJobRunner,
    reporter: &FakeReporter,
) -> Serializer<RetryingStore<FakeStore>, FakeJobRunner, FakeReporter> {
    Serializer::new(
        SerializerDeps {
            store: RetryingStore::new(store.clone(), Backoff::default()),
            runner: runner.clone(),
            reporter: reporter.clone(),
        },
        SerializerConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn interrupt_ends_throttle_backoff_during_setup() {
    let store = FakeStore::new();
    store.throttle_next(u32::MAX);
    let runner = FakeJobRunner::new();
    let reporter = FakeReporter::new();
    let serializer = retrying_serializer(&store, &runner, &reporter);
    let start = Instant::now();

    let outcome = tokio::time::timeout(
        Duration::from_secs(120),
        serializer.serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_millis(1500))),
    )
    .await
    .expect("serialize kept retrying after the interrupt")
    .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
    assert!(runner.started().is_empty());
    assert_eq!(reporter.names(), vec!["serialize:interrupted"]);
    assert_eq!(
        store.count_calls(|c| matches!(c, StoreCall::AddWaiting { .. })),
        0
    );
}

#[tokio::test(start_paused = true)]
async fn interrupt_ends_table_creation_wait() {
    let h = harness();
    let store = FakeStore::new()
        .with_table_statuses(std::iter::repeat(TableStatus::Creating).take(100_000));
    let serializer = Serializer::new(
        SerializerDeps {
            store: store.clone(),
            runner: h.runner.clone(),
            reporter: h.reporter.clone(),
        },
        SerializerConfig::default(),
    );

    let outcome = tokio::time::timeout(
        Duration::from_secs(120),
        serializer.serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_millis(2500))),
    )
    .await
    .expect("table wait ignored the interrupt")
    .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(store.count_calls(|c| *c == StoreCall::DescribeTable), 3);
    assert_eq!(store.count_calls(|c| matches!(c, StoreCall::Get { .. })), 0);
    assert!(h.runner.started().is_empty());
    assert_eq!(h.reporter.names(), vec!["serialize:interrupted"]);
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_throttled_poll_still_leaves_waiting_set() {
    let store = FakeStore::new();
    store.force_state("alpha", ProjectState::Active);
    let runner = FakeJobRunner::new();
    let reporter = FakeReporter::new();
    let serializer = retrying_serializer(&store, &runner, &reporter);
    let throttled = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        throttled.throttle_next(10);
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(120),
        serializer.serialize("alpha", "deploy.yml", &interrupt_after(Duration::from_millis(3500))),
    )
    .await
    .expect("activation wait ignored the interrupt")
    .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert!(runner.started().is_empty());
    let record = store.record("alpha").unwrap();
    assert_eq!(record.state, ProjectState::Active);
    assert!(record.waiting.is_empty(), "waiting left {:?}", record.waiting);
    assert_eq!(
        store.count_calls(|c| matches!(c, StoreCall::SetState { .. })),
        0
    );
    assert_eq!(reporter.names().last(), Some(&"serialize:interrupted"));
}
