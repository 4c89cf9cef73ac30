//! Example: Serialized toast notifications
//!
//! This example demonstrates:
//! 1. Queuing several notifications and watching them display one at a time
//! 2. Dismissing early and invoking an action
//!
//! Run with:
//! ```bash
//! cargo run -p herald-notify --example toast_queue
//! ```

use herald_notify::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

/// Prints every haptic request instead of buzzing anything
#[derive(Debug)]
struct ConsoleHaptics;

impl HapticFeedback for ConsoleHaptics {
    fn notify(&self, kind: HapticKind) {
        println!("  *bzz* {:?}", kind);
    }
}

#[tokio::main]
async fn main() {
    println!("==============================================");
    println!("   Herald Notify: Toast Queue");
    println!("==============================================\n");

    let defaults = NotificationDefaults::default()
        .with_duration(Severity::Success, Duration::from_millis(600))
        .with_duration(Severity::Info, Duration::from_millis(400))
        .with_duration(Severity::Error, Duration::from_millis(800));

    let dispatcher = NotificationDispatcher::builder()
        .haptics(ConsoleHaptics)
        .defaults(defaults)
        .build();

    // Print every change to the active slot, like a UI layer would render it.
    let mut active = dispatcher.subscribe();
    let start = Instant::now();
    let watcher = tokio::spawn(async move {
        while active.changed().await.is_ok() {
            let line = match active.borrow_and_update().as_ref() {
                Some(toast) => format!("[{}] {}", toast.severity(), toast.message()),
                None => "(nothing displayed)".to_string(),
            };
            println!("{:>6}ms  {}", start.elapsed().as_millis(), line);
        }
    });

    println!("=== Example 1: FIFO display ===\n");
    dispatcher.show_info("Downloading deck");
    dispatcher.show_success("Deck downloaded");
    dispatcher.show_error("Audio pack failed");
    println!("  phase after queuing three: {:?}", dispatcher.phase());

    tokio::time::sleep(Duration::from_millis(2_000)).await;

    println!("\n=== Example 2: Dismiss and actions ===\n");
    dispatcher.show(
        Notification::warning("Lesson deleted")
            .with_duration(Duration::from_secs(30))
            .with_action("Undo", || println!("  -> undo requested")),
    );
    dispatcher.show_info("Streak saved");

    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("  invoking action: {}", dispatcher.invoke_action());

    tokio::time::sleep(Duration::from_millis(100)).await;
    if let Some(dismissed) = dispatcher.dismiss() {
        println!("  dismissed early: {}", dismissed.message());
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(dispatcher);
    let _ = watcher.await;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");
}
