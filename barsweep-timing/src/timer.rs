use serde::Serialize;
use std::time::{Duration, Instant};

/// Trait for monotonic timers used to profile the frame loop
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn record_frame(&mut self, d: Duration);
    fn stats(&self) -> FrameTimeStats;
}

/// Summary of recorded per-frame durations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameTimeStats {
    pub frames: usize,
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub frames_per_second: f64,
}

impl FrameTimeStats {
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let times: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            frames: times.len(),
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            frames_per_second: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frame_times: Vec<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }
    fn stats(&self) -> FrameTimeStats {
        FrameTimeStats::from_durations(&self.frame_times)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            start: Instant::now(),
            frame_times: Vec::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_known_durations() {
        let mut t = HighPrecisionTimer::new();
        for ms in [2u64, 4, 6] {
            t.record_frame(Duration::from_millis(ms));
        }
        let s = t.stats();
        assert_eq!(s.frames, 3);
        assert_eq!(s.average_frame_time_ns, 4_000_000.0);
        assert_eq!(s.min_frame_time_ns, 2_000_000.0);
        assert_eq!(s.max_frame_time_ns, 6_000_000.0);
        assert!((s.frames_per_second - 250.0).abs() < 1e-9);
    }

    #[test]
    fn oldest_samples_are_dropped_at_capacity() {
        let mut t = HighPrecisionTimer::with_capacity(2);
        t.record_frame(Duration::from_millis(100));
        t.record_frame(Duration::from_millis(1));
        t.record_frame(Duration::from_millis(1));
        assert_eq!(t.frame_times.len(), 2);
        assert_eq!(t.stats().max_frame_time_ns, 1_000_000.0);
    }

    #[test]
    fn empty_timer_reports_zeroes() {
        assert_eq!(HighPrecisionTimer::new().stats(), FrameTimeStats::default());
    }
}
