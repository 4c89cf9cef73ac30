//! Example: Loading a lesson catalog from a flaky backend
//!
//! Shows the three ways to drive the executor:
//! 1. Plain exponential backoff, with an observer printing each retry
//! 2. A strategy that refuses to retry permission errors
//! 3. Cancelling from another task while the executor is backing off
//!
//! Run with:
//! ```bash
//! cargo run -p herald-core --example retry_example
//! ```

use herald_core::prelude::*;
use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Backend that answers only after `outages` failed requests
struct Catalog {
    requests: AtomicU32,
    outages: u32,
}

impl Catalog {
    fn with_outages(outages: u32) -> Self {
        Self {
            requests: AtomicU32::new(0),
            outages,
        }
    }

    async fn fetch(&self) -> io::Result<Vec<&'static str>> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if request <= self.outages {
            println!("  request #{request}: timed out");
            return Err(io::Error::new(io::ErrorKind::TimedOut, "catalog timed out"));
        }
        println!("  request #{request}: ok");
        Ok(vec!["kana", "numbers", "greetings"])
    }

    fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Gives up immediately on authentication failures
struct TransientOnly(RetryPolicy);

impl BackoffStrategy for TransientOnly {
    fn max_attempts(&self) -> u32 {
        self.0.max_attempts()
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        self.0.next_delay(attempt)
    }

    fn should_retry(&self, error: &dyn Error, _attempt: u32) -> bool {
        !error.to_string().contains("not signed in")
    }
}

async fn backoff_with_observer() -> Result<(), Box<dyn Error>> {
    println!("--- 1. backoff with observer ---");

    let policy = RetryPolicy::builder()
        .max_attempts(4)
        .initial_delay(Duration::from_millis(100))
        .build();
    let executor = RetryExecutor::new().on_retry(|event| {
        println!(
            "  retry {}/{} in {:?} ({})",
            event.attempt, event.max_attempts, event.delay, event.error
        );
    });

    let catalog = Catalog::with_outages(2);
    let started = Instant::now();
    let lessons = executor.execute(&policy, || catalog.fetch()).await?;

    println!(
        "  got {} lessons after {} requests in {:?} (planned waits: {:?})\n",
        lessons.len(),
        catalog.requests(),
        started.elapsed(),
        policy.total_delay()
    );
    Ok(())
}

async fn selective_retry() -> Result<(), Box<dyn Error>> {
    println!("--- 2. selective retry ---");

    let strategy = TransientOnly(RetryPolicy::new(3, Duration::from_millis(10), 2.0));
    let executor = RetryExecutor::new();

    let denied = executor
        .execute(&strategy, || async {
            Err::<(), _>(io::Error::new(io::ErrorKind::PermissionDenied, "not signed in"))
        })
        .await;
    if let Err(err) = denied {
        println!("  permission error: gave up after {} attempt(s)", err.attempts());
    }

    let catalog = Catalog::with_outages(2);
    executor.execute(&strategy, || catalog.fetch()).await?;
    println!("  timeouts: recovered after {} requests\n", catalog.requests());
    Ok(())
}

async fn cancel_while_waiting() {
    println!("--- 3. cancellation ---");

    let policy = RetryPolicy::new(10, Duration::from_millis(200), 2.0);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("  screen closed, cancelling");
        trigger.cancel();
    });

    let catalog = Catalog::with_outages(u32::MAX);
    match RetryExecutor::new()
        .execute_with_cancel(&policy, &token, || catalog.fetch())
        .await
    {
        Err(err) if err.is_cancelled() => println!("  {err}\n"),
        other => println!("  unexpected: {other:?}\n"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    backoff_with_observer().await?;
    selective_retry().await?;
    cancel_while_waiting().await;
    Ok(())
}
