use std::f64::consts::TAU;

use crate::radio::params::ParamSnapshot;
use crate::types::{IqSample, Waveform, BLOCK_SIZE, SAMPLE_RATE, TONE_FREQUENCY};

/// Per-sample phase step of the synthesis tone
pub const PHASE_INCREMENT: f64 = TAU * TONE_FREQUENCY / SAMPLE_RATE;

/// Synthesize one block into `block`, starting at `phase`.
///
/// Returns the phase for the first sample of the next block, wrapped into
/// [0, 2π). The only state carried between blocks is that phase.
pub fn fill_block(block: &mut [IqSample], phase: f64, params: &ParamSnapshot) -> f64 {
    let amplitude = params.amplitude;
    let mut phase = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if phase >= TAU {
        phase = 0.0;
    }

    for sample in block.iter_mut() {
        let (i, q) = match params.waveform {
            Waveform::Sine => (phase.cos(), phase.sin()),
            Waveform::Square => (square(phase.cos()), square(phase.sin())),
        };

        *sample = IqSample::new((i * amplitude) as f32, (q * amplitude) as f32);

        phase += PHASE_INCREMENT;
        if phase >= TAU {
            phase -= TAU;
        }
    }

    phase
}

/// Allocate and synthesize a full [`BLOCK_SIZE`] block
#[allow(dead_code)]
pub fn produce_block(phase: f64, params: &ParamSnapshot) -> (Vec<IqSample>, f64) {
    let mut block = vec![IqSample::new(0.0, 0.0); BLOCK_SIZE];
    let next_phase = fill_block(&mut block, phase, params);
    (block, next_phase)
}

fn square(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Phase accumulator owned by the streaming thread
#[derive(Debug, Default)]
pub struct SignalGenerator {
    phase: f64,
}

impl SignalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `block` using the current settings and advance the phase
    pub fn next_block(&mut self, block: &mut [IqSample], params: &ParamSnapshot) {
        self.phase = fill_block(block, self.phase, params);
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> f64 {
        self.phase
    }
}
