//! Serialized notification dispatcher.
//!
//! One notification is active at a time. Everything else waits in a FIFO
//! backlog and is promoted when the active one expires, is dismissed, or has
//! its action invoked.
//!
//! # Timer identity
//!
//! Every promotion bumps a generation counter and arms a single-shot timer
//! task tagged with that generation. When the timer fires it retires the
//! active notification only if the generation still matches, so a timer that
//! outlives its notification (for example because it woke just as the user
//! dismissed) can never cut a later notification short. `dismiss` also
//! aborts the pending timer task outright.

use crate::config::NotificationDefaults;
use crate::haptics::{HapticFeedback, NoHaptics};
use crate::notification::{Notification, NotificationId, Severity};
use herald_core::time::{Clock, TokioClock};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Coarse dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing active, nothing queued
    Idle,
    /// One notification active, nothing queued
    Displaying,
    /// One notification active, more waiting
    DisplayingWithBacklog,
}

impl Phase {
    fn of(active: bool, backlog_len: usize) -> Self {
        match (active, backlog_len) {
            (false, _) => Phase::Idle,
            (true, 0) => Phase::Displaying,
            (true, _) => Phase::DisplayingWithBacklog,
        }
    }
}

/// Point-in-time copy of the dispatcher's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherState {
    /// The notification currently displayed.
    pub active: Option<Notification>,
    /// Waiting notifications, oldest first. Never contains `active`.
    pub backlog: Vec<Notification>,
}

impl DispatcherState {
    /// Phase this snapshot is in.
    pub fn phase(&self) -> Phase {
        Phase::of(self.active.is_some(), self.backlog.len())
    }
}

/// Why the active notification left the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retirement {
    Expired,
    Dismissed,
    ActionInvoked,
}

struct Armed {
    notification: Notification,
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    active: Option<Armed>,
    backlog: VecDeque<Notification>,
    next_generation: u64,
}

impl Slot {
    fn phase(&self) -> Phase {
        Phase::of(self.active.is_some(), self.backlog.len())
    }

    fn holds(&self, id: NotificationId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|armed| armed.notification.id() == id)
            || self.backlog.iter().any(|queued| queued.id() == id)
    }
}

struct Inner {
    slot: Mutex<Slot>,
    active_tx: watch::Sender<Option<Notification>>,
    haptics: Arc<dyn HapticFeedback>,
    clock: Arc<dyn Clock>,
    defaults: NotificationDefaults,
    runtime: Handle,
}

impl Inner {
    /// Move the backlog head into the active slot. Caller holds the lock and
    /// has already emptied the slot.
    fn promote_next(this: &Arc<Self>, slot: &mut Slot) {
        let Some(notification) = slot.backlog.pop_front() else {
            this.active_tx.send_replace(None);
            return;
        };

        slot.next_generation += 1;
        let generation = slot.next_generation;
        let timer = Self::arm(this, generation, notification.duration());

        debug!(
            id = %notification.id(),
            severity = %notification.severity(),
            generation,
            backlog = slot.backlog.len(),
            "promoted notification"
        );

        this.haptics.notify(notification.severity().haptic());
        this.active_tx.send_replace(Some(notification.clone()));
        slot.active = Some(Armed {
            notification,
            generation,
            timer,
        });
    }

    fn arm(this: &Arc<Self>, generation: u64, duration: Duration) -> JoinHandle<()> {
        let dispatcher: Weak<Self> = Arc::downgrade(this);
        let clock = Arc::clone(&this.clock);

        this.runtime.spawn(async move {
            clock.sleep(duration).await;
            if let Some(inner) = dispatcher.upgrade() {
                Self::retire(&inner, Some(generation), Retirement::Expired);
            }
        })
    }

    /// Clear the active slot and promote the next notification.
    ///
    /// With `Some(generation)` the slot is only cleared if it still holds
    /// that generation.
    fn retire(
        this: &Arc<Self>,
        generation: Option<u64>,
        reason: Retirement,
    ) -> Option<Notification> {
        let mut slot = this.slot.lock();

        let Some(armed) = slot
            .active
            .take_if(|armed| generation.is_none_or(|expected| armed.generation == expected))
        else {
            trace!(?generation, ?reason, "nothing to retire");
            return None;
        };

        if reason != Retirement::Expired {
            armed.timer.abort();
        }

        debug!(
            id = %armed.notification.id(),
            generation = armed.generation,
            ?reason,
            "retired notification"
        );

        Self::promote_next(this, &mut slot);
        Some(armed.notification)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(armed) = self.slot.get_mut().active.take() {
            armed.timer.abort();
        }
    }
}

/// Serialized FIFO dispatcher for transient notifications.
///
/// Cloning is cheap and every clone drives the same queue; share one
/// dispatcher across the application.
///
/// # Examples
///
/// ```rust
/// use herald_notify::{Notification, NotificationDispatcher, Phase};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dispatcher = NotificationDispatcher::new();
///
/// dispatcher.show_info("Syncing");
/// dispatcher.show(Notification::error("Sync failed"));
/// assert_eq!(dispatcher.phase(), Phase::DisplayingWithBacklog);
/// assert_eq!(dispatcher.active().map(|n| n.message().to_owned()), Some("Syncing".into()));
///
/// dispatcher.dismiss();
/// assert_eq!(dispatcher.active().map(|n| n.message().to_owned()), Some("Sync failed".into()));
/// # }
/// ```
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

impl NotificationDispatcher {
    /// Dispatcher with default durations, no haptics, and the Tokio clock.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use
    /// [`DispatcherBuilder::runtime`] to pass a handle explicitly.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Queue a notification.
    ///
    /// If nothing is active the notification is promoted before this returns:
    /// haptics fire and its expiry timer is armed.
    ///
    /// A notification whose id is already active or queued (a clone of one
    /// shown earlier) is ignored, so each id is displayed at most once per
    /// pass through the queue.
    pub fn show(&self, notification: Notification) -> NotificationId {
        let id = notification.id();
        let mut slot = self.inner.slot.lock();

        if slot.holds(id) {
            debug!(%id, "ignoring notification that is already active or queued");
            return id;
        }

        slot.backlog.push_back(notification);
        trace!(%id, backlog = slot.backlog.len(), "queued notification");

        if slot.active.is_none() {
            Inner::promote_next(&self.inner, &mut slot);
        }
        id
    }

    /// Queue a success notification with the configured default duration.
    pub fn show_success(&self, message: impl Into<String>) -> NotificationId {
        self.show_with_default(message, Severity::Success)
    }

    /// Queue an error notification with the configured default duration.
    pub fn show_error(&self, message: impl Into<String>) -> NotificationId {
        self.show_with_default(message, Severity::Error)
    }

    /// Queue a warning notification with the configured default duration.
    pub fn show_warning(&self, message: impl Into<String>) -> NotificationId {
        self.show_with_default(message, Severity::Warning)
    }

    /// Queue an info notification with the configured default duration.
    pub fn show_info(&self, message: impl Into<String>) -> NotificationId {
        self.show_with_default(message, Severity::Info)
    }

    fn show_with_default(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let duration = self.inner.defaults.duration_for(severity);
        self.show(Notification::new(message, severity).with_duration(duration))
    }

    /// Dismiss the active notification and promote the next one.
    ///
    /// Returns the dismissed notification, or `None` when idle.
    pub fn dismiss(&self) -> Option<Notification> {
        Inner::retire(&self.inner, None, Retirement::Dismissed)
    }

    /// Run the active notification's action, then dismiss it.
    ///
    /// The callback runs without the dispatcher lock held, so it may call
    /// back into the dispatcher. If the notification expired or was dismissed
    /// while the callback ran, whatever is active afterwards is left alone.
    /// Returns `false` when nothing is active or the active notification has
    /// no action.
    pub fn invoke_action(&self) -> bool {
        let (generation, action) = {
            let slot = self.inner.slot.lock();
            let found = slot.active.as_ref().and_then(|armed| {
                armed
                    .notification
                    .action()
                    .cloned()
                    .map(|action| (armed.generation, action))
            });
            match found {
                Some(found) => found,
                None => return false,
            }
        };

        debug!(label = action.label(), generation, "invoking notification action");
        action.invoke();
        Inner::retire(&self.inner, Some(generation), Retirement::ActionInvoked);
        true
    }

    /// The notification currently displayed.
    pub fn active(&self) -> Option<Notification> {
        self.inner
            .slot
            .lock()
            .active
            .as_ref()
            .map(|armed| armed.notification.clone())
    }

    /// Snapshot of the active notification and the backlog.
    pub fn state(&self) -> DispatcherState {
        let slot = self.inner.slot.lock();
        DispatcherState {
            active: slot.active.as_ref().map(|armed| armed.notification.clone()),
            backlog: slot.backlog.iter().cloned().collect(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.inner.slot.lock().phase()
    }

    /// Number of notifications waiting behind the active one.
    pub fn backlog_len(&self) -> usize {
        self.inner.slot.lock().backlog.len()
    }

    /// Watch the active notification.
    ///
    /// The receiver sees a new value on every promotion and every time the
    /// slot empties.
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.active_tx.subscribe()
    }

    /// Per-severity durations used by the `show_*` helpers.
    pub fn defaults(&self) -> &NotificationDefaults {
        &self.inner.defaults
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.slot.lock();
        f.debug_struct("NotificationDispatcher")
            .field(
                "active",
                &slot.active.as_ref().map(|armed| armed.notification.id()),
            )
            .field("backlog", &slot.backlog.len())
            .field("generation", &slot.next_generation)
            .field("haptics", &self.inner.haptics)
            .field("clock", &self.inner.clock)
            .finish()
    }
}

/// Builder for [`NotificationDispatcher`].
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    haptics: Option<Arc<dyn HapticFeedback>>,
    clock: Option<Arc<dyn Clock>>,
    defaults: NotificationDefaults,
    runtime: Option<Handle>,
}

impl DispatcherBuilder {
    /// Haptic collaborator called on every promotion.
    pub fn haptics(mut self, haptics: impl HapticFeedback + 'static) -> Self {
        self.haptics = Some(Arc::new(haptics));
        self
    }

    /// Clock used by expiry timers.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Per-severity durations for the `show_*` helpers.
    pub fn defaults(mut self, defaults: NotificationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Runtime that expiry timers are spawned on.
    ///
    /// Defaults to the runtime `build` is called from.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the dispatcher.
    ///
    /// # Panics
    ///
    /// Panics if no runtime handle was given and this is called outside a
    /// Tokio runtime.
    pub fn build(self) -> NotificationDispatcher {
        let (active_tx, _) = watch::channel(None);
        NotificationDispatcher {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::default()),
                active_tx,
                haptics: self.haptics.unwrap_or_else(|| Arc::new(NoHaptics)),
                clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
                defaults: self.defaults,
                runtime: self.runtime.unwrap_or_else(Handle::current),
            }),
        }
    }
}
