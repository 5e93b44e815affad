//! Rest countdown scheduling.
//!
//! A [`TickScheduler`] produces one tick per period while started. Every
//! `start` hands out a fresh [`TickToken`]; the session only honours ticks
//! carrying the token of the countdown it is running, so a tick already in
//! flight when the countdown was cancelled is dropped on arrival.

use std::time::Duration;

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken(u64);

pub trait TickScheduler {
    /// Starts (or restarts) ticking. Any previous run is cancelled first.
    fn start(&mut self) -> TickToken;
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

/// Ticks once per `period` on a tokio task, delivering tokens over a channel.
pub struct IntervalTicker {
    period: Duration,
    tx: UnboundedSender<TickToken>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> (Self, UnboundedReceiver<TickToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            period,
            tx,
            task: None,
            generation: 0,
        };
        (ticker, rx)
    }

    pub fn every_second() -> (Self, UnboundedReceiver<TickToken>) {
        Self::new(Duration::from_secs(1))
    }
}

impl TickScheduler for IntervalTicker {
    fn start(&mut self) -> TickToken {
        self.cancel();
        self.generation += 1;
        let token = TickToken(self.generation);

        let tx = self.tx.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(token).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(generation = self.generation, "rest ticker started");
        token
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(generation = self.generation, "rest ticker cancelled");
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler that never ticks on its own; counts starts and cancels.
#[derive(Debug, Default)]
pub struct ManualTicker {
    generation: u64,
    active: bool,
    pub starts: usize,
    pub cancels: usize,
}

impl ManualTicker {
    /// Token of the current run, if one is active.
    pub fn current(&self) -> Option<TickToken> {
        self.active.then_some(TickToken(self.generation))
    }
}

impl TickScheduler for ManualTicker {
    fn start(&mut self) -> TickToken {
        self.cancel();
        self.generation += 1;
        self.active = true;
        self.starts += 1;
        TickToken(self.generation)
    }

    fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.cancels += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_delivers_current_token() {
        let (mut ticker, mut rx) = IntervalTicker::new(Duration::from_secs(1));
        let token = ticker.start();
        assert!(ticker.is_active());

        time::advance(Duration::from_millis(1100)).await;
        assert_eq!(rx.recv().await, Some(token));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_issues_new_token_and_cancel_stops_ticks() {
        let (mut ticker, mut rx) = IntervalTicker::new(Duration::from_secs(1));
        let first = ticker.start();
        let second = ticker.start();
        assert_ne!(first, second);

        time::advance(Duration::from_millis(1100)).await;
        assert_eq!(rx.recv().await, Some(second));

        ticker.cancel();
        assert!(!ticker.is_active());
        time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn manual_ticker_counts() {
        let mut t = ManualTicker::default();
        assert_eq!(t.current(), None);
        let a = t.start();
        let b = t.start();
        assert_ne!(a, b);
        assert_eq!(t.current(), Some(b));
        t.cancel();
        t.cancel();
        assert_eq!((t.starts, t.cancels), (2, 2));
    }
}
