//! Timer tasks on the tokio runtime, held in single-occupancy slots.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// When a periodic timer fires first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    Immediate,
    AfterPeriod,
}

/// Owns at most one timer task. Arming it again cancels the previous task,
/// so two timers from the same slot are never live together.
#[derive(Debug)]
pub struct TimerSlot {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// Install `handle`, aborting whatever the slot held before.
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    /// Abort the held task. Returns false if the slot was empty.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::trace!(timer = self.name, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// True while the held task has not finished
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `tick` every `period` until the task is aborted.
///
/// Ticks never overlap: a slow tick delays the next one instead of bunching.
pub fn every<F, Fut>(period: Duration, first: FirstTick, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    // tokio panics on a zero period
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let start = match first {
            FirstTick::Immediate => Instant::now(),
            FirstTick::AfterPeriod => Instant::now() + period,
        };
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tick().await;
        }
    })
}

/// Run `task` once after `delay`.
pub fn after<Fut>(delay: Duration, task: Fut) -> JoinHandle<()>
where
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_after_period_skips_immediate_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new("test");
        slot.replace(every(Duration::from_secs(10), FirstTick::AfterPeriod, counting(&counter)));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(26)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(slot.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_immediate_fires_at_start() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _slot = {
            let mut slot = TimerSlot::new("test");
            slot.replace(every(Duration::from_secs(900), FirstTick::Immediate, counting(&counter)));
            slot
        };

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_cancels_previous_timer() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new("test");

        slot.replace(every(Duration::from_secs(1), FirstTick::AfterPeriod, counting(&first)));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        slot.replace(every(Duration::from_secs(1), FirstTick::AfterPeriod, counting(&second)));
        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut slot = TimerSlot::new("test");
        let task = counting(&counter);
        slot.replace(after(Duration::from_millis(500), async move {
            let mut task = task;
            task().await;
        }));

        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert!(!slot.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
