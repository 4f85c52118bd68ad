//! The notification currently shown to the user, and its expiry timer.
//!
//! A `Notifier` is a cheap cloneable handle to one shared `AlertState`. Both
//! polling loops write through it; the presentation layer reads it or
//! subscribes to changes. Each raised alert arms a single-shot timer that
//! clears the message after `AlertLevel::display_duration`; raising again
//! replaces the pending timer, so at most one is ever outstanding.
//!
//! Writes are serialized by a mutex around the timer bookkeeping. A
//! generation counter guards against a timer that fires concurrently with a
//! newer `raise`.

use crate::logging::{self, Component};
use crate::model::{Alert, AlertLevel, AlertState};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Clone)]
pub struct Notifier {
    shared: Arc<Shared>,
}

struct Shared {
    state: watch::Sender<AlertState>,
    expiry: Mutex<Expiry>,
}

#[derive(Default)]
struct Expiry {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Shared {
    fn lock_expiry(&self) -> MutexGuard<'_, Expiry> {
        self.expiry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expire(&self, generation: u64) {
        let mut expiry = self.lock_expiry();
        if expiry.generation != generation {
            return;
        }
        expiry.timer = None;
        self.state.send_modify(|state| {
            state.message.clear();
            state.level = AlertLevel::None;
        });
        logging::debug(Component::Notifier, None, "Alert expired");
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let expiry = match self.expiry.get_mut() {
            Ok(expiry) => expiry,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(timer) = expiry.timer.take() {
            timer.abort();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AlertState::default());
        Notifier {
            shared: Arc::new(Shared {
                state,
                expiry: Mutex::new(Expiry::default()),
            }),
        }
    }

    /// Snapshot of the current notification.
    pub fn current(&self) -> AlertState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every change to the notification.
    pub fn subscribe(&self) -> watch::Receiver<AlertState> {
        self.shared.state.subscribe()
    }

    /// Shows `alert` and (re)arms the expiry timer for its level.
    ///
    /// An alert at `AlertLevel::None` is ignored. Must be called from within
    /// a Tokio runtime.
    pub fn raise(&self, alert: Alert) {
        if alert.level == AlertLevel::None {
            return;
        }
        let deadline = Instant::now() + alert.level.display_duration();

        let mut expiry = self.shared.lock_expiry();
        if let Some(previous) = expiry.timer.take() {
            previous.abort();
        }
        expiry.generation += 1;
        let generation = expiry.generation;

        logging::info(
            Component::Notifier,
            Some(&alert.level.to_string()),
            &alert.message,
        );
        self.shared.state.send_modify(|state| {
            state.message = alert.message;
            state.level = alert.level;
        });

        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        expiry.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(generation);
            }
        }));
    }

    /// Records the newest magnitude seen by the tracker. Does not touch the
    /// message, level or timer.
    pub fn record_magnitude(&self, magnitude: f64) {
        self.shared.state.send_if_modified(|state| {
            if state.last_observed_magnitude == Some(magnitude) {
                false
            } else {
                state.last_observed_magnitude = Some(magnitude);
                true
            }
        });
    }

    /// `true` while an expiry timer is armed and has not fired.
    pub fn has_pending_expiry(&self) -> bool {
        self.shared
            .lock_expiry()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Cancels the pending expiry timer. The current message is left as is;
    /// nothing is written after this returns unless `raise` is called again.
    pub fn shutdown(&self) {
        let mut expiry = self.shared.lock_expiry();
        expiry.generation += 1;
        if let Some(timer) = expiry.timer.take() {
            timer.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
