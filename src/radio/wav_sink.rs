use anyhow::{Context, Result};
use chrono::Local;
use hound::{WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::radio::sink::{TxMetadata, TxStream, Tuning};
use crate::types::{IqSample, SAMPLE_RATE};

/// Placeholder in a capture path that is replaced by the open timestamp
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Transmit stream that captures I/Q to a stereo float WAV file (I left,
/// Q right) at the design sample rate.
///
/// Sends are throttled to real time so the loop runs at the same cadence as
/// it would against a radio.
pub struct WavStream {
    writer: Option<WavWriter<BufWriter<File>>>,
    path: PathBuf,
    burst_start: Option<Instant>,
    samples_written: u64,
    last_flush: Instant,
    throttle: bool,
}

impl WavStream {
    /// Create the capture file. `{timestamp}` in the path is expanded.
    pub fn create(path: &str) -> Result<Self> {
        let path = expand_timestamp(path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let spec = WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let writer = WavWriter::create(&path, spec)
            .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

        info!(path = %path.display(), "Capturing I/Q to WAV");

        Ok(Self {
            writer: Some(writer),
            path,
            burst_start: None,
            samples_written: 0,
            last_flush: Instant::now(),
            throttle: true,
        })
    }

    /// Write as fast as possible instead of pacing to the sample rate
    #[allow(dead_code)]
    pub fn without_throttle(mut self) -> Self {
        self.throttle = false;
        self
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pace(&self) {
        let Some(start) = self.burst_start else {
            return;
        };
        let due = Duration::from_secs_f64(self.samples_written as f64 / SAMPLE_RATE);
        let elapsed = start.elapsed();
        if due > elapsed {
            thread::sleep(due - elapsed);
        }
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .with_context(|| format!("Failed to finalize WAV file: {}", self.path.display()))?;
            info!(
                path = %self.path.display(),
                samples = self.samples_written,
                "WAV capture finalized"
            );
        }
        Ok(())
    }
}

impl TxStream for WavStream {
    fn send(&mut self, samples: &[IqSample], metadata: TxMetadata) -> Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("WAV capture already finalized"))?;

        if metadata.start_of_burst || self.burst_start.is_none() {
            self.burst_start = Some(Instant::now());
            self.samples_written = 0;
        }

        for sample in samples {
            writer.write_sample(sample.re).context("Failed to write I sample")?;
            writer.write_sample(sample.im).context("Failed to write Q sample")?;
        }
        self.samples_written += samples.len() as u64;

        // Periodically flush so an interrupted capture is still readable
        if self.last_flush.elapsed() > Duration::from_secs(2) {
            writer.flush().context("Failed to flush WAV file")?;
            self.last_flush = Instant::now();
        }

        if metadata.end_of_burst {
            self.finalize()?;
        } else if self.throttle {
            self.pace();
        }

        Ok(samples.len())
    }

    fn retune(&mut self, tuning: Tuning) -> Result<()> {
        // The capture is baseband only; the front-end settings are just logged
        debug!(
            frequency_hz = tuning.frequency_hz,
            gain_db = tuning.gain_db,
            "WAV capture retuned"
        );
        Ok(())
    }
}

impl Drop for WavStream {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            warn!(error = %e, "Failed to finalize WAV capture on drop");
        }
    }
}

/// Replace `{timestamp}` with the local time
pub fn expand_timestamp(path: &str) -> PathBuf {
    if path.contains(TIMESTAMP_PLACEHOLDER) {
        PathBuf::from(path.replace(TIMESTAMP_PLACEHOLDER, &generate_timestamp()))
    } else {
        PathBuf::from(path)
    }
}

/// Generate a timestamp for file naming
pub fn generate_timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn test_timestamp_format() {
        let timestamp = generate_timestamp();
        assert_eq!(timestamp.len(), 15); // YYYYMMDD-HHMMSS
        assert!(timestamp.contains('-'));
    }

    #[test]
    fn test_expand_timestamp() {
        let expanded = expand_timestamp("captures/tx-{timestamp}.wav");
        let name = expanded.to_string_lossy().to_string();
        assert!(!name.contains(TIMESTAMP_PLACEHOLDER));
        assert!(name.starts_with("captures/tx-"));
        assert_eq!(expand_timestamp("plain.wav"), PathBuf::from("plain.wav"));
    }

    #[test]
    fn test_capture_interleaves_iq() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.wav");

        let mut stream = WavStream::create(path.to_str().unwrap())
            .unwrap()
            .without_throttle();

        let block = vec![IqSample::new(0.25, -0.75), IqSample::new(-1.0, 1.0)];
        stream
            .send(&block, TxMetadata { start_of_burst: true, end_of_burst: false })
            .unwrap();
        stream
            .send(&[], TxMetadata { start_of_burst: false, end_of_burst: true })
            .unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 1_000_000);

        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.25, -0.75, -1.0, 1.0]);
    }

    #[test]
    fn test_drop_without_end_of_burst_finalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.wav");

        {
            let mut stream = WavStream::create(path.to_str().unwrap())
                .unwrap()
                .without_throttle();
            stream
                .send(
                    &[IqSample::new(0.5, 0.5)],
                    TxMetadata { start_of_burst: true, end_of_burst: false },
                )
                .unwrap();
        }

        let mut reader = WavReader::open(&path).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.5, 0.5]);
    }

    #[test]
    fn test_send_after_end_of_burst_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.wav");

        let mut stream = WavStream::create(path.to_str().unwrap()).unwrap();
        stream
            .send(&[], TxMetadata { start_of_burst: false, end_of_burst: true })
            .unwrap();

        let result = stream.send(&[IqSample::new(0.0, 0.0)], TxMetadata::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_throttled_capture_runs_at_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paced.wav");

        let mut stream = WavStream::create(path.to_str().unwrap()).unwrap();
        let block = vec![IqSample::new(0.0, 0.0); 2048];

        let started = Instant::now();
        stream
            .send(&block, TxMetadata { start_of_burst: true, end_of_burst: false })
            .unwrap();
        for _ in 0..9 {
            stream.send(&block, TxMetadata::default()).unwrap();
        }

        // 10 blocks of 2048 samples at 1 MHz
        assert!(started.elapsed() >= Duration::from_micros(20_000));
        assert!(stream.path().ends_with("paced.wav"));
    }
}
