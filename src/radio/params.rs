use std::sync::atomic::Ordering;

use crate::types::{AtomicF64, AtomicWaveform, Waveform, DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY, DEFAULT_GAIN};

/// Point-in-time copy of the signal settings, taken once per cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub frequency_hz: f64,
    pub gain_db: f64,
    pub amplitude: f64,
    pub waveform: Waveform,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY,
            gain_db: DEFAULT_GAIN,
            amplitude: DEFAULT_AMPLITUDE,
            waveform: Waveform::Sine,
        }
    }
}

/// Signal settings shared between the control surface and the streaming
/// thread.
///
/// Every field is its own atomic cell. Setters never validate and never block;
/// a snapshot may mix old and new values when several fields change at once.
#[derive(Debug)]
pub struct SignalParams {
    /// Center frequency (Hz)
    pub frequency: AtomicF64,

    /// Transmit gain (dB)
    pub gain: AtomicF64,

    /// Sample amplitude (nominally 0.0 - 1.0)
    pub amplitude: AtomicF64,

    /// Waveform shape
    pub waveform: AtomicWaveform,
}

impl SignalParams {
    pub fn new(initial: ParamSnapshot) -> Self {
        Self {
            frequency: AtomicF64::new(initial.frequency_hz),
            gain: AtomicF64::new(initial.gain_db),
            amplitude: AtomicF64::new(initial.amplitude),
            waveform: AtomicWaveform::new(initial.waveform),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.load(Ordering::Relaxed)
    }

    pub fn set_frequency(&self, hz: f64) {
        self.frequency.store(hz, Ordering::Relaxed);
    }

    pub fn gain(&self) -> f64 {
        self.gain.load(Ordering::Relaxed)
    }

    pub fn set_gain(&self, db: f64) {
        self.gain.store(db, Ordering::Relaxed);
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude.load(Ordering::Relaxed)
    }

    pub fn set_amplitude(&self, amplitude: f64) {
        self.amplitude.store(amplitude, Ordering::Relaxed);
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform.load(Ordering::Relaxed)
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform, Ordering::Relaxed);
    }

    /// Read every field once. No cross-field consistency.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            frequency_hz: self.frequency(),
            gain_db: self.gain(),
            amplitude: self.amplitude(),
            waveform: self.waveform(),
        }
    }
}

impl Default for SignalParams {
    fn default() -> Self {
        Self::new(ParamSnapshot::default())
    }
}
