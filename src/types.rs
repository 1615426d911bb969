use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Design sample rate (samples/second) of the generated baseband
pub const SAMPLE_RATE: f64 = 1e6;

/// Fixed synthesis tone frequency (Hz)
pub const TONE_FREQUENCY: f64 = 10e3;

/// Samples per generated block
pub const BLOCK_SIZE: usize = 2048;

/// Default center frequency (Hz)
pub const DEFAULT_FREQUENCY: f64 = 915e6;

/// Default transmit gain (dB)
pub const DEFAULT_GAIN: f64 = 40.0;

/// Default amplitude (0.0 - 1.0)
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Display refresh interval
pub const DISPLAY_REFRESH: Duration = Duration::from_millis(33);

/// Maximum number of points handed to the plot
pub const MAX_PLOT_POINTS: usize = 500;

/// How long the control surface waits after start before reading the
/// connection status
pub const STATUS_GRACE: Duration = Duration::from_millis(500);

/// Wall-clock duration of one block at the design sample rate
pub fn block_duration(len: usize) -> Duration {
    Duration::from_nanos((len as f64 * 1e9 / SAMPLE_RATE).round() as u64)
}

/// One complex baseband sample, transmitted as interleaved 32-bit floats
pub type IqSample = num_complex::Complex32;

/// Atomic f64 wrapper so settings can be shared with the streaming thread
/// without locks
#[derive(Debug)]
pub struct AtomicF64 {
    storage: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            storage: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> f64 {
        f64::from_bits(self.storage.load(ordering))
    }

    pub fn store(&self, value: f64, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering);
    }
}

/// Waveform shape produced by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
}

impl Waveform {
    pub fn toggled(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::Sine,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Waveform::Sine,
            _ => Waveform::Square,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waveform::Sine => write!(f, "Sine"),
            Waveform::Square => write!(f, "Square"),
        }
    }
}

/// Atomic cell holding a [`Waveform`]
#[derive(Debug)]
pub struct AtomicWaveform {
    storage: AtomicU8,
}

impl AtomicWaveform {
    pub fn new(value: Waveform) -> Self {
        Self {
            storage: AtomicU8::new(value.to_u8()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> Waveform {
        Waveform::from_u8(self.storage.load(ordering))
    }

    pub fn store(&self, value: Waveform, ordering: Ordering) {
        self.storage.store(value.to_u8(), ordering);
    }
}

/// Lifecycle of the streaming loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl StreamState {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            StreamState::Idle => 0,
            StreamState::Starting => 1,
            StreamState::Running => 2,
            StreamState::Stopping => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => StreamState::Starting,
            2 => StreamState::Running,
            3 => StreamState::Stopping,
            _ => StreamState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f64_round_trips_bits() {
        let cell = AtomicF64::new(0.0);
        for value in [1.0, -0.25, 915e6, f64::MIN_POSITIVE] {
            cell.store(value, Ordering::Relaxed);
            assert_eq!(cell.load(Ordering::Relaxed).to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_waveform_toggle() {
        assert_eq!(Waveform::Sine.toggled(), Waveform::Square);
        assert_eq!(Waveform::Square.toggled(), Waveform::Sine);

        let cell = AtomicWaveform::new(Waveform::Sine);
        cell.store(Waveform::Square, Ordering::Relaxed);
        assert_eq!(cell.load(Ordering::Relaxed), Waveform::Square);
    }

    #[test]
    fn test_block_duration() {
        let duration = block_duration(BLOCK_SIZE);
        assert_eq!(duration.as_micros(), 2048);
    }
}
