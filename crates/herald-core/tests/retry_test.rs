//! Integration tests for the retry executor

use herald_core::prelude::*;
use herald_core::time::RecordingClock;
use proptest::prelude::*;
use rstest::rstest;
use std::io;
use std::time::Duration;
use tokio::time::Instant;

fn always_failing_run(policy: &RetryPolicy) -> (u32, Vec<Duration>, RetryError<io::Error>) {
    let clock = RecordingClock::new();
    let executor = RetryExecutor::new().with_clock(clock.clone());
    let mut calls = 0;

    let outcome = tokio_test::block_on(executor.execute(policy, || {
        calls += 1;
        let current = calls;
        async move { Err::<(), _>(io::Error::other(format!("attempt {current}"))) }
    }));

    let err = outcome.expect_err("operation never succeeds");
    (calls, clock.sleeps(), err)
}

proptest! {
    #[test]
    fn prop_always_failing_makes_n_attempts_and_n_minus_one_delays(
        max_attempts in 1u32..16,
        initial_ms in 0u64..2_000,
        multiplier in 1u32..4,
    ) {
        let policy = RetryPolicy::new(
            max_attempts,
            Duration::from_millis(initial_ms),
            f64::from(multiplier),
        );

        let (calls, sleeps, err) = always_failing_run(&policy);

        prop_assert_eq!(calls, max_attempts);
        prop_assert_eq!(sleeps.len() as u32, max_attempts - 1);
        prop_assert_eq!(err.attempts(), max_attempts);
        let expected_message = format!("attempt {max_attempts}");
        prop_assert_eq!(
            err.last_error().map(ToString::to_string),
            Some(expected_message)
        );
    }

    #[test]
    fn prop_delay_k_is_initial_times_multiplier_pow_k_minus_one(
        max_attempts in 2u32..10,
        initial_ms in 1u64..1_000,
        multiplier in 1u64..4,
    ) {
        let policy = RetryPolicy::new(
            max_attempts,
            Duration::from_millis(initial_ms),
            multiplier as f64,
        );

        let (_, sleeps, _) = always_failing_run(&policy);

        for (index, delay) in sleeps.iter().enumerate() {
            let expected = Duration::from_millis(initial_ms * multiplier.pow(index as u32));
            prop_assert_eq!(*delay, expected);
        }
    }

    #[test]
    fn prop_immediate_success_never_waits(max_attempts in 1u32..32) {
        let clock = RecordingClock::new();
        let executor = RetryExecutor::new().with_clock(clock.clone());
        let policy = RetryPolicy::new(max_attempts, Duration::from_secs(1), 2.0);
        let mut calls = 0;

        let outcome = tokio_test::block_on(executor.execute(&policy, || {
            calls += 1;
            async { Ok::<_, io::Error>("ok") }
        }));

        prop_assert_eq!(outcome.ok(), Some("ok"));
        prop_assert_eq!(calls, 1);
        prop_assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn prop_recovers_when_failures_fit_in_budget(
        max_attempts in 2u32..12,
        failures in 0u32..11,
    ) {
        prop_assume!(failures < max_attempts);

        let clock = RecordingClock::new();
        let executor = RetryExecutor::new().with_clock(clock.clone());
        let policy = RetryPolicy::new(max_attempts, Duration::from_millis(10), 2.0);
        let mut calls = 0;

        let outcome = tokio_test::block_on(executor.execute(&policy, || {
            calls += 1;
            let current = calls;
            async move {
                if current <= failures {
                    Err(io::Error::other("transient"))
                } else {
                    Ok(current)
                }
            }
        }));

        prop_assert_eq!(outcome.ok(), Some(failures + 1));
        prop_assert_eq!(clock.sleeps().len() as u32, failures);
    }
}

#[tokio::test(start_paused = true)]
async fn test_three_attempts_wait_one_then_two_seconds() {
    let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);
    let start = Instant::now();
    let mut invoked_at = Vec::new();

    let outcome = RetryExecutor::new()
        .execute(&policy, || {
            invoked_at.push(start.elapsed());
            async { Err::<(), _>(io::Error::other("unavailable")) }
        })
        .await;

    assert!(matches!(
        outcome,
        Err(RetryError::OperationFailure { attempts: 3, .. })
    ));
    assert_eq!(invoked_at.len(), 3);

    let gaps: Vec<Duration> = invoked_at.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(gaps[0] >= Duration::from_secs(1) && gaps[0] < Duration::from_millis(1_010));
    assert!(gaps[1] >= Duration::from_secs(2) && gaps[1] < Duration::from_millis(2_010));
}

#[rstest]
#[case::single_attempt(1, vec![])]
#[case::two_attempts(2, vec![Duration::from_millis(250)])]
#[case::four_attempts(
    4,
    vec![Duration::from_millis(250), Duration::from_millis(500), Duration::from_secs(1)]
)]
#[tokio::test]
async fn test_delay_sequence(#[case] max_attempts: u32, #[case] expected: Vec<Duration>) {
    let clock = RecordingClock::new();
    let policy = RetryPolicy::new(max_attempts, Duration::from_millis(250), 2.0);

    let _ = RetryExecutor::new()
        .with_clock(clock.clone())
        .execute(&policy, || async { Err::<(), _>(io::Error::other("x")) })
        .await;

    assert_eq!(clock.sleeps(), expected);
    assert_eq!(policy.delays().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_capped_policy_never_exceeds_cap() {
    let clock = RecordingClock::new();
    let policy = RetryPolicy::builder()
        .max_attempts(6)
        .initial_delay(Duration::from_secs(1))
        .multiplier(4.0)
        .max_delay(Duration::from_secs(10))
        .build();

    let _ = RetryExecutor::new()
        .with_clock(clock.clone())
        .execute(&policy, || async { Err::<(), _>(io::Error::other("x")) })
        .await;

    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(10),
            Duration::from_secs(10),
            Duration::from_secs(10),
        ]
    );
}

#[tokio::test]
async fn test_executor_is_shareable_across_tasks() {
    let executor = RetryExecutor::new().with_clock(RecordingClock::new());
    let policy = RetryPolicy::new(3, Duration::from_millis(5), 2.0);

    let handles: Vec<_> = (0..8u32)
        .map(|id| {
            let executor = executor.clone();
            let policy = policy.clone();
            tokio::spawn(async move {
                let mut calls = 0u32;
                executor
                    .execute(&policy, || {
                        calls += 1;
                        let current = calls;
                        async move {
                            if current < 2 {
                                Err(io::Error::other("first try fails"))
                            } else {
                                Ok(id)
                            }
                        }
                    })
                    .await
            })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), id as u32);
    }
}

#[tokio::test]
async fn test_cancellation_is_distinct_from_failure() {
    let token = CancellationToken::new();
    let executor = RetryExecutor::new().with_clock(RecordingClock::new());
    let policy = RetryPolicy::default();
    let canceller = token.clone();

    let outcome = executor
        .execute_with_cancel(&policy, &token, || {
            canceller.cancel();
            async { Err::<(), _>(io::Error::other("fails")) }
        })
        .await;

    let err = outcome.unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.last_error().is_none());
}
