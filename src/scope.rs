use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::radio::SnapshotBuffer;
use crate::types::IqSample;

/// Smallest visible window when zoomed in (samples)
pub const MIN_WINDOW: usize = 50;

/// Plot-ready I and Q traces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeTrace {
    pub i: Vec<(f64, f64)>,
    pub q: Vec<(f64, f64)>,
}

impl ScopeTrace {
    /// Build traces from the leading `limit` samples of a block
    pub fn from_block(block: &[IqSample], limit: usize) -> Self {
        let count = block.len().min(limit);
        let mut trace = Self {
            i: Vec::with_capacity(count),
            q: Vec::with_capacity(count),
        };

        for (n, sample) in block.iter().take(count).enumerate() {
            trace.i.push((n as f64, sample.re as f64));
            trace.q.push((n as f64, sample.im as f64));
        }

        trace
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i.is_empty()
    }
}

/// Periodic reader of the snapshot buffer feeding the scope view.
///
/// Runs on the UI thread. Pulls at most once per refresh interval, keeps the
/// last trace while paused, and caps the number of plotted points.
pub struct DisplaySampler {
    snapshot: Arc<SnapshotBuffer>,
    refresh: Duration,
    max_points: usize,
    window: usize,
    paused: bool,
    last_pull: Option<Instant>,
    trace: Option<ScopeTrace>,
}

impl DisplaySampler {
    pub fn new(snapshot: Arc<SnapshotBuffer>, refresh: Duration, max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            snapshot,
            refresh,
            max_points,
            window: max_points,
            paused: false,
            last_pull: None,
            trace: None,
        }
    }

    /// Pull a fresh snapshot if the refresh interval has elapsed.
    ///
    /// Returns true when the trace changed.
    pub fn poll(&mut self) -> bool {
        if self.paused {
            return false;
        }

        if let Some(last) = self.last_pull {
            if last.elapsed() < self.refresh {
                return false;
            }
        }

        self.pull()
    }

    /// Pull now, ignoring the refresh interval (but not pause)
    pub fn pull(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.last_pull = Some(Instant::now());

        match self.snapshot.read() {
            Some(block) => {
                self.trace = Some(ScopeTrace::from_block(&block, self.window));
                true
            }
            None => false,
        }
    }

    pub fn trace(&self) -> Option<&ScopeTrace> {
        self.trace.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Number of samples currently shown
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn zoom_in(&mut self) {
        self.window = (self.window / 2).max(MIN_WINDOW.min(self.max_points));
    }

    pub fn zoom_out(&mut self) {
        self.window = (self.window * 2).min(self.max_points);
    }

    pub fn reset_zoom(&mut self) {
        self.window = self.max_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BLOCK_SIZE, MAX_PLOT_POINTS};

    fn sampler() -> (DisplaySampler, Arc<SnapshotBuffer>) {
        let snapshot = Arc::new(SnapshotBuffer::new());
        let sampler = DisplaySampler::new(snapshot.clone(), Duration::from_millis(33), MAX_PLOT_POINTS);
        (sampler, snapshot)
    }

    fn ramp(len: usize) -> Vec<IqSample> {
        (0..len)
            .map(|n| IqSample::new(n as f32, -(n as f32)))
            .collect()
    }

    #[test]
    fn test_nothing_before_publish() {
        let (mut sampler, _) = sampler();
        assert!(!sampler.poll());
        assert!(sampler.trace().is_none());
    }

    #[test]
    fn test_trace_is_capped() {
        let (mut sampler, snapshot) = sampler();
        snapshot.publish(&ramp(BLOCK_SIZE));

        assert!(sampler.poll());
        let trace = sampler.trace().unwrap();
        assert_eq!(trace.len(), 500);
        assert_eq!(trace.i[499], (499.0, 499.0));
        assert_eq!(trace.q[10], (10.0, -10.0));
    }

    #[test]
    fn test_short_block_is_not_padded() {
        let trace = ScopeTrace::from_block(&ramp(20), 500);
        assert_eq!(trace.len(), 20);
    }

    #[test]
    fn test_refresh_interval_limits_pulls() {
        let (mut sampler, snapshot) = sampler();
        snapshot.publish(&ramp(BLOCK_SIZE));

        assert!(sampler.poll());
        assert!(!sampler.poll());

        std::thread::sleep(Duration::from_millis(40));
        assert!(sampler.poll());
    }

    #[test]
    fn test_pause_freezes_trace() {
        let (mut sampler, snapshot) = sampler();
        snapshot.publish(&ramp(BLOCK_SIZE));
        sampler.pull();

        sampler.toggle_pause();
        snapshot.publish(&vec![IqSample::new(0.0, 0.0); BLOCK_SIZE]);
        assert!(!sampler.pull());
        assert_eq!(sampler.trace().unwrap().i[1], (1.0, 1.0));

        sampler.toggle_pause();
        assert!(sampler.pull());
        assert_eq!(sampler.trace().unwrap().i[1], (1.0, 0.0));
    }

    #[test]
    fn test_zoom_bounds() {
        let (mut sampler, _) = sampler();
        for _ in 0..10 {
            sampler.zoom_in();
        }
        assert_eq!(sampler.window(), MIN_WINDOW);

        for _ in 0..10 {
            sampler.zoom_out();
        }
        assert_eq!(sampler.window(), MAX_PLOT_POINTS);

        sampler.zoom_in();
        sampler.reset_zoom();
        assert_eq!(sampler.window(), MAX_PLOT_POINTS);
    }
}
