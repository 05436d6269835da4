use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub total_ticks: u64,
}

/// Rolling frame/tick counters, reported once per interval.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    total_ticks: u64,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            ticks: 0,
            total_ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
        self.total_ticks = self.total_ticks.saturating_add(1);
    }

    pub(crate) fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            total_ticks: self.total_ticks,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_rates_over_interval() {
        let base = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1), base);
        metrics.record_frame(Duration::from_millis(20));
        metrics.record_frame(Duration::from_millis(20));
        for _ in 0..4 {
            metrics.record_tick();
        }

        let snapshot = metrics
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("snapshot");
        assert!((snapshot.fps - 1.0).abs() < 0.01);
        assert!((snapshot.tps - 2.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);
        assert_eq!(snapshot.total_ticks, 4);
    }

    #[test]
    fn interval_resets_rates_but_not_total() {
        let base = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1), base);
        metrics.record_tick();
        assert!(metrics
            .maybe_snapshot(base + Duration::from_millis(400))
            .is_none());

        let first = base + Duration::from_secs(1);
        metrics.maybe_snapshot(first).expect("first");
        metrics.record_tick();
        let second = metrics
            .maybe_snapshot(first + Duration::from_secs(1))
            .expect("second");
        assert!((second.tps - 1.0).abs() < 0.01);
        assert_eq!(metrics.total_ticks(), 2);
    }
}
