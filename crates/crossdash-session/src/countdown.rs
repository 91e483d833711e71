//! Live ETA countdown.
//!
//! [`CountdownState`] is the pure sequence logic; [`CountdownScheduler`] owns
//! the timer task that applies one tick per period and publishes the head on
//! a `watch` channel. At most one timer runs per scheduler, and dropping the
//! scheduler cancels it.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Remaining ETA estimates; the head is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownState {
    remaining: VecDeque<u32>,
}

impl CountdownState {
    /// Returns `None` for an empty sequence: there is nothing to display.
    #[must_use]
    pub fn new(initial: Vec<u32>) -> Option<Self> {
        if initial.is_empty() {
            return None;
        }
        Some(Self {
            remaining: initial.into(),
        })
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        // Never empty: `new` rejects empty input and `tick` keeps one element.
        self.remaining.front().copied().unwrap_or_default()
    }

    /// True once only the final estimate is left.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.remaining.len() <= 1
    }

    /// Drops the head. Returns `false` (and changes nothing) once settled.
    pub fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        self.remaining.pop_front();
        true
    }

    /// Estimates left, the current one included.
    #[must_use]
    pub fn steps_left(&self) -> usize {
        self.remaining.len()
    }
}

struct ActiveTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the ticking timer of one session.
pub struct CountdownScheduler {
    period: Duration,
    active: Option<ActiveTimer>,
}

impl CountdownScheduler {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: None,
        }
    }

    /// Starts counting `initial` down, cancelling any previous timer first.
    ///
    /// The returned receiver holds `initial[0]` immediately and sees a new
    /// value every period until one estimate remains. Its sender is dropped
    /// once the countdown settles, so `changed()` then reports closure while
    /// `borrow()` keeps the final value. An empty `initial` yields `None`
    /// and starts no timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, initial: Vec<u32>) -> watch::Receiver<Option<u32>> {
        self.cancel();

        let Some(state) = CountdownState::new(initial) else {
            tracing::warn!("empty ETA sequence; countdown not started");
            let (_tx, rx) = watch::channel(None);
            return rx;
        };

        let (tx, rx) = watch::channel(Some(state.current()));
        if state.is_settled() {
            tracing::debug!(eta = state.current(), "single ETA estimate; no timer needed");
            return rx;
        }

        tracing::debug!(
            eta = state.current(),
            steps = state.steps_left(),
            period_secs = self.period.as_secs(),
            "countdown started"
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(state, self.period, tx, cancel.clone()));
        self.active = Some(ActiveTimer { cancel, handle });
        rx
    }

    /// Stops the running timer, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.active.take() {
            timer.cancel.cancel();
            tracing::debug!("countdown cancelled");
        }
    }

    /// True while a timer task is still ticking.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }
}

impl Drop for CountdownScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_timer(
    mut state: CountdownState,
    period: Duration,
    tx: watch::Sender<Option<u32>>,
    cancel: CancellationToken,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            _ = interval.tick() => {
                state.tick();
                if tx.send(Some(state.current())).is_err() {
                    tracing::debug!("countdown has no listeners; stopping");
                    break;
                }
                if state.is_settled() {
                    tracing::debug!(eta = state.current(), "countdown reached final estimate");
                    break;
                }
            }
        }
    }
}
