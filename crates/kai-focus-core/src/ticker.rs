//! Periodic tick driver.
//!
//! The components never spawn timers themselves. A caller that wants a live
//! session acquires a [`TickHandle`] when the session starts and releases it
//! on every exit path; dropping the handle cancels the timer.
//!
//! ```ignore
//! let guard = Arc::new(Mutex::new(guard));
//! let ticking = Arc::clone(&guard);
//! let handle = ticker::spawn(config.hyperfocus.tick_interval(), move || {
//!     let mut guard = ticking.lock().unwrap();
//!     guard.tick();
//!     if guard.is_active() { ControlFlow::Continue(()) } else { ControlFlow::Break(()) }
//! });
//! ```

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Owned timer. Cancelled when dropped.
#[derive(Debug)]
pub struct TickHandle {
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Cancel the timer now.
    pub fn stop(self) {}

    /// `true` once the callback asked to stop.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the callback returns `ControlFlow::Break`.
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                tracing::warn!("tick callback panicked");
            }
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Call `on_tick` every `period` until it breaks or the handle is dropped.
///
/// The first call happens one full period after spawning. Late ticks are
/// delayed rather than bunched up. Must be called inside a tokio runtime.
pub fn spawn<F>(period: Duration, mut on_tick: F) -> TickHandle
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if on_tick().is_break() {
                tracing::debug!("ticker stopped by callback");
                break;
            }
        }
    });
    TickHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{FixedOffset, TimeZone};

    use crate::clock::ManualClock;
    use crate::hyperfocus::{HyperfocusGuard, UrgencyLevel};
    use crate::storage::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = spawn(Duration::from_secs(60), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(122)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = spawn(Duration::from_secs(1), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        handle.stop();
        let stopped_at = count.load(Ordering::SeqCst);
        assert_eq!(stopped_at, 2);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_the_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handle = spawn(Duration::from_secs(1), move || {
            if seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        handle.join().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn drives_guard_until_session_ends() {
        let clock = ManualClock::at(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
                .unwrap(),
        );
        let mut guard = HyperfocusGuard::new(MemoryStore::new(), clock.clone());
        guard.start_session();
        let guard = Arc::new(Mutex::new(guard));

        let ticking = Arc::clone(&guard);
        let handle = spawn(Duration::from_secs(60), move || {
            // One wall-clock minute per tick.
            clock.advance_minutes(1);
            let mut guard = ticking.lock().unwrap();
            guard.tick();
            if guard.urgency_level() >= UrgencyLevel::Strong {
                guard.end_session();
            }
            if guard.is_active() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
        handle.join().await;

        let guard = guard.lock().unwrap();
        let record = &guard.session_history()[0];
        assert_eq!(record.duration, 45);
        assert_eq!(record.final_urgency_level, UrgencyLevel::Strong);
        // Gentle from minute 25 through 44, then the strong tick.
        assert_eq!(record.breaks_suggested, 21);
    }
}
