use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Repeating timer that drives status checks. At most one timer is live per
/// scheduler: `start` replaces any running one, `stop` is safe to call at any
/// time. Ticks fire on the period without waiting for the previous callback
/// to resolve; each callback runs as its own task, so the callback must
/// tolerate being invoked again while an earlier round trip is in flight.
pub struct PollScheduler {
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            timer: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start<F, Fut>(&self, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(previous) = timer.take() {
                previous.abort();
                debug!("replaced running poll timer");
            }
            let period = self.period;
            *timer = Some(tokio::spawn(async move {
                // first fire one full period from now, like a plain repeating timer
                let mut ticker = time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    tokio::spawn(tick());
                }
            }));
        }
    }

    pub fn stop(&self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
                debug!("stopped poll timer");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        match self.timer.lock() {
            Ok(timer) => timer
                .as_ref()
                .map(|handle| !handle.is_finished())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn ticks_repeatedly_until_stopped() {
        let scheduler = PollScheduler::new(Duration::from_millis(20));
        let counter = Arc::new(AtomicUsize::new(0));
        scheduler.start(counting_tick(counter.clone()));
        assert!(scheduler.is_running());

        time::sleep(Duration::from_millis(110)).await;
        scheduler.stop();
        time::sleep(Duration::from_millis(30)).await;

        let after_stop = counter.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected at least 2 ticks, got {}", after_stop);
        assert!(!scheduler.is_running());

        time::sleep(Duration::from_millis(80)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn first_tick_waits_a_full_period() {
        let scheduler = PollScheduler::new(Duration::from_millis(100));
        let counter = Arc::new(AtomicUsize::new(0));
        scheduler.start(counting_tick(counter.clone()));

        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        scheduler.stop();
    }

    #[tokio::test]
    async fn restart_replaces_the_previous_timer() {
        let scheduler = PollScheduler::new(Duration::from_millis(20));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        scheduler.start(counting_tick(first.clone()));
        scheduler.start(counting_tick(second.clone()));

        time::sleep(Duration::from_millis(90)).await;
        scheduler.stop();
        time::sleep(Duration::from_millis(30)).await;

        // the first timer was cancelled before it ever fired
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert!(second.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_safe_when_never_started() {
        let scheduler = PollScheduler::new(Duration::from_millis(20));
        assert!(!scheduler.is_running());
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
