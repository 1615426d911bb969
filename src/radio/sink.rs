use anyhow::Result;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::radio::params::ParamSnapshot;
use crate::types::{block_duration, IqSample};

/// Burst markers attached to every send, mirroring the hardware TX metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxMetadata {
    pub start_of_burst: bool,
    pub end_of_burst: bool,
}

/// Radio front-end settings applied to an open stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub frequency_hz: f64,
    pub gain_db: f64,
}

impl From<&ParamSnapshot> for Tuning {
    fn from(params: &ParamSnapshot) -> Self {
        Self {
            frequency_hz: params.frequency_hz,
            gain_db: params.gain_db,
        }
    }
}

/// An open, one-way transmit path
pub trait TxStream: Send {
    /// Send samples. An empty slice with `end_of_burst` closes the burst.
    fn send(&mut self, samples: &[IqSample], metadata: TxMetadata) -> Result<usize>;

    /// Apply new front-end settings without interrupting the stream
    fn retune(&mut self, _tuning: Tuning) -> Result<()> {
        Ok(())
    }
}

/// Something that can turn a device target descriptor into a [`TxStream`].
///
/// The descriptor is opaque to the streaming loop; only the backend reads it.
pub trait TxBackend: Send + Sync {
    fn open(&self, target: &str, tuning: Tuning) -> Result<Box<dyn TxStream>>;
}

/// Connection state of a [`TransmitSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    Closing,
}

/// Transmit session owned by the streaming thread.
///
/// Wraps an optional hardware stream. When there is no stream, every send is
/// replaced by an idle wait of one block duration so the loop keeps the same
/// cadence.
pub struct TransmitSession {
    stream: Option<Box<dyn TxStream>>,
    state: SessionState,
    metadata: TxMetadata,
    tuning: Option<Tuning>,
    send_errors: u64,
}

impl TransmitSession {
    /// Attempt to open `target` exactly once. Failure is logged and leaves the
    /// session unconnected.
    pub fn try_open(backend: &dyn TxBackend, target: &str, tuning: Tuning) -> Self {
        let stream = match backend.open(target, tuning) {
            Ok(stream) => {
                info!(target = %target, "Transmit device opened");
                Some(stream)
            }
            Err(e) => {
                if target.is_empty() {
                    info!("No device target, simulating transmission");
                } else {
                    warn!(target = %target, error = %e, "Failed to open transmit device, simulating");
                }
                None
            }
        };

        let state = if stream.is_some() {
            SessionState::Connected
        } else {
            SessionState::Unconnected
        };

        Self {
            stream,
            state,
            metadata: TxMetadata {
                start_of_burst: true,
                end_of_burst: false,
            },
            tuning: Some(tuning),
            send_errors: 0,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Number of failed sends on a connected session
    pub fn send_errors(&self) -> u64 {
        self.send_errors
    }

    /// Push new front-end settings to the device if they changed
    pub fn apply_tuning(&mut self, tuning: Tuning) {
        if self.tuning == Some(tuning) {
            return;
        }
        self.tuning = Some(tuning);

        if let Some(stream) = self.stream.as_mut() {
            match stream.retune(tuning) {
                Ok(()) => debug!(
                    frequency_hz = tuning.frequency_hz,
                    gain_db = tuning.gain_db,
                    "Retuned transmit device"
                ),
                Err(e) => warn!(error = %e, "Failed to retune transmit device"),
            }
        }
    }

    /// Send one block, or wait out its duration when simulating
    pub fn send(&mut self, block: &[IqSample]) {
        let started = Instant::now();

        let Some(stream) = self.stream.as_mut() else {
            thread::sleep(block_duration(block.len()));
            return;
        };

        match stream.send(block, self.metadata) {
            Ok(_) => {
                if self.metadata.start_of_burst {
                    debug!("Start of burst sent");
                }
                self.metadata.start_of_burst = false;
            }
            Err(e) => {
                self.send_errors += 1;
                warn!(error = %e, errors = self.send_errors, "Transmit send failed");
                // Keep the cycle cadence even though the device rejected the block
                let remaining = block_duration(block.len()).saturating_sub(started.elapsed());
                if remaining > Duration::ZERO {
                    thread::sleep(remaining);
                }
            }
        }
    }

    /// Close the session, sending end-of-burst if it was ever connected.
    /// Calling it again is a no-op.
    pub fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };

        self.state = SessionState::Closing;
        let metadata = TxMetadata {
            start_of_burst: false,
            end_of_burst: true,
        };

        if let Err(e) = stream.send(&[], metadata) {
            warn!(error = %e, "Failed to send end of burst");
        } else {
            debug!("End of burst sent");
        }

        drop(stream);
        info!("Transmit device closed");
    }
}

impl Drop for TransmitSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Backend with no devices at all; every open fails so the loop simulates
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SimulatedBackend;

#[cfg(test)]
impl TxBackend for SimulatedBackend {
    fn open(&self, _target: &str, _tuning: Tuning) -> Result<Box<dyn TxStream>> {
        anyhow::bail!("Simulation only")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::mock::{MockBackend, SinkEvent};
    use crate::types::BLOCK_SIZE;

    fn tuning() -> Tuning {
        Tuning {
            frequency_hz: 915e6,
            gain_db: 40.0,
        }
    }

    #[test]
    fn test_open_failure_is_unconnected() {
        let backend = MockBackend::failing();
        let mut session = TransmitSession::try_open(&backend, "type=b200", tuning());
        assert_eq!(session.state(), SessionState::Unconnected);

        session.close();
        assert!(backend.events().iter().all(|e| !matches!(e, SinkEvent::Send { .. })));
    }

    #[test]
    fn test_burst_markers() {
        let backend = MockBackend::connecting();
        let mut session = TransmitSession::try_open(&backend, "mock", tuning());
        assert!(session.is_connected());

        let block = vec![IqSample::new(0.5, -0.5); BLOCK_SIZE];
        session.send(&block);
        session.send(&block);
        session.close();

        let sends: Vec<_> = backend.sends();
        assert_eq!(sends.len(), 3);
        assert_eq!(sends[0], (BLOCK_SIZE, TxMetadata { start_of_burst: true, end_of_burst: false }));
        assert_eq!(sends[1], (BLOCK_SIZE, TxMetadata::default()));
        assert_eq!(sends[2], (0, TxMetadata { start_of_burst: false, end_of_burst: true }));
    }

    #[test]
    fn test_close_twice_sends_one_end_of_burst() {
        let backend = MockBackend::connecting();
        let mut session = TransmitSession::try_open(&backend, "mock", tuning());
        session.close();
        session.close();
        drop(session);

        let ends = backend
            .sends()
            .iter()
            .filter(|(_, md)| md.end_of_burst)
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_simulated_send_waits_one_block() {
        let mut session = TransmitSession::try_open(&SimulatedBackend, "", tuning());
        let block = vec![IqSample::new(0.0, 0.0); BLOCK_SIZE];

        let started = Instant::now();
        for _ in 0..5 {
            session.send(&block);
        }
        assert!(started.elapsed() >= block_duration(BLOCK_SIZE) * 5);
    }

    #[test]
    fn test_retune_only_on_change() {
        let backend = MockBackend::connecting();
        let mut session = TransmitSession::try_open(&backend, "mock", tuning());

        session.apply_tuning(tuning());
        session.apply_tuning(Tuning {
            frequency_hz: 2.4e9,
            gain_db: 40.0,
        });
        session.apply_tuning(Tuning {
            frequency_hz: 2.4e9,
            gain_db: 40.0,
        });

        let retunes = backend
            .events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Retune(_)))
            .count();
        assert_eq!(retunes, 1);
    }

    #[test]
    fn test_send_failure_keeps_session_connected() {
        let backend = MockBackend::connecting().with_send_failures();
        let mut session = TransmitSession::try_open(&backend, "mock", tuning());
        let block = vec![IqSample::new(0.0, 0.0); 64];

        session.send(&block);
        assert_eq!(session.send_errors(), 1);
        assert!(session.is_connected());
    }
}
