//! Reference once-per-second tick source.
//!
//! The engine never reads the clock itself. Anything that calls `tick()`
//! serially once per second will do; this is the tokio-based one the CLI
//! uses. Late ticks are delivered in a burst rather than dropped, so a
//! stalled runtime never loses session time.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::events::Event;

/// Something that consumes ticks one at a time.
pub trait TickSink {
    /// Apply one elapsed second.
    fn on_tick(&mut self) -> Vec<Event>;

    /// Whether further ticks would have any effect.
    fn accepts_ticks(&self) -> bool;
}

pub struct Ticker {
    interval: Interval,
}

impl Ticker {
    pub fn every_second() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        // first tick one period from now, not immediately
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { interval }
    }

    /// Wait for the next tick.
    pub async fn next(&mut self) {
        self.interval.tick().await;
    }

    /// Forget overdue ticks; the next one is a full period from now.
    ///
    /// Call after the sink was paused so the paused time is not replayed.
    pub fn reset(&mut self) {
        self.interval.reset();
    }

    /// Feed ticks into `sink` until it stops accepting them.
    ///
    /// `on_event` sees every event in order; tick N's events are reported
    /// before tick N+1 is awaited.
    pub async fn drive<S, F>(&mut self, sink: &mut S, mut on_event: F) -> u64
    where
        S: TickSink,
        F: FnMut(&Event),
    {
        let mut ticks = 0;
        while sink.accepts_ticks() {
            self.next().await;
            ticks += 1;
            for event in sink.on_tick() {
                on_event(&event);
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown {
        left: u32,
        seen: u32,
    }

    impl TickSink for Countdown {
        fn on_tick(&mut self) -> Vec<Event> {
            self.seen += 1;
            self.left = self.left.saturating_sub(1);
            Vec::new()
        }

        fn accepts_ticks(&self) -> bool {
            self.left > 0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drive_stops_when_sink_is_done() {
        let mut ticker = Ticker::every_second();
        let mut sink = Countdown { left: 5, seen: 0 };
        let start = Instant::now();
        let ticks = ticker.drive(&mut sink, |_| {}).await;
        assert_eq!(ticks, 5);
        assert_eq!(sink.seen, 5);
        assert!(Instant::now() - start >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn missed_ticks_are_delivered() {
        let mut ticker = Ticker::every_second();
        time::advance(Duration::from_millis(3_500)).await;
        let mut sink = Countdown { left: 3, seen: 0 };
        let before = Instant::now();
        ticker.drive(&mut sink, |_| {}).await;
        // all three were already due; no extra waiting
        assert_eq!(sink.seen, 3);
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_drops_overdue_ticks() {
        let mut ticker = Ticker::every_second();
        time::advance(Duration::from_secs(10)).await;
        ticker.reset();
        let before = Instant::now();
        ticker.next().await;
        assert_eq!(Instant::now() - before, Duration::from_secs(1));
    }
}
