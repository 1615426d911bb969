use anyhow::Result;

use crate::radio::sink::{TxBackend, TxStream, Tuning};
use crate::radio::wav_sink::WavStream;

/// Scheme prefix for WAV capture targets, e.g. `wav:captures/tx-{timestamp}.wav`
pub const WAV_SCHEME: &str = "wav:";

/// Backend that picks a driver from the target descriptor's scheme.
///
/// An empty target means "simulate only" and always fails to open.
#[derive(Debug, Default)]
pub struct DeviceRegistry;

impl DeviceRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Human readable driver name for a target
    pub fn driver_name(target: &str) -> &'static str {
        if target.is_empty() {
            "simulation"
        } else if target.starts_with(WAV_SCHEME) {
            "wav capture"
        } else {
            "unsupported"
        }
    }
}

impl TxBackend for DeviceRegistry {
    fn open(&self, target: &str, _tuning: Tuning) -> Result<Box<dyn TxStream>> {
        if target.is_empty() {
            anyhow::bail!("Simulation only");
        }

        if let Some(path) = target.strip_prefix(WAV_SCHEME) {
            if path.is_empty() {
                anyhow::bail!("WAV target '{}' has no path", target);
            }
            return Ok(Box::new(WavStream::create(path)?));
        }

        anyhow::bail!("No driver for device target '{}'", target)
    }
}
