use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

use crate::radio::generator::SignalGenerator;
use crate::radio::params::SignalParams;
use crate::radio::sink::{TransmitSession, Tuning, TxBackend};
use crate::radio::snapshot::SnapshotBuffer;
use crate::types::{IqSample, StreamState, BLOCK_SIZE};

/// State shared between the control surface and the streaming thread
struct Shared {
    params: Arc<SignalParams>,
    snapshot: Arc<SnapshotBuffer>,
    backend: Arc<dyn TxBackend>,
    running: AtomicBool,
    connected: AtomicBool,
    state: AtomicU8,
    cycles: AtomicU64,
}

impl Shared {
    fn set_state(&self, state: StreamState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

/// Owns the generation/streaming thread: generator -> sink -> snapshot, once
/// per cycle, until stopped.
pub struct Streamer {
    shared: Arc<Shared>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl Streamer {
    pub fn new(
        params: Arc<SignalParams>,
        snapshot: Arc<SnapshotBuffer>,
        backend: Arc<dyn TxBackend>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                params,
                snapshot,
                backend,
                running: AtomicBool::new(false),
                connected: AtomicBool::new(false),
                state: AtomicU8::new(StreamState::Idle.to_u8()),
                cycles: AtomicU64::new(0),
            }),
            thread_handle: None,
        }
    }

    /// Spawn the streaming thread against `target`.
    ///
    /// Fails if a stream is already active; the running thread is left alone.
    pub fn start(&mut self, target: &str) -> Result<()> {
        if self.thread_handle.is_some() {
            anyhow::bail!("Already streaming");
        }

        self.shared.connected.store(false, Ordering::Relaxed);
        self.shared.cycles.store(0, Ordering::Relaxed);
        self.shared.running.store(true, Ordering::Release);
        self.shared.set_state(StreamState::Starting);

        let shared = self.shared.clone();
        let target = target.to_string();

        let spawned = thread::Builder::new()
            .name("txscope-stream".to_string())
            .spawn(move || run_stream_loop(&shared, &target));

        match spawned {
            Ok(handle) => {
                self.thread_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Relaxed);
                self.shared.set_state(StreamState::Idle);
                Err(anyhow::anyhow!("Failed to spawn streaming thread: {}", e))
            }
        }
    }

    /// Request cancellation and wait for the streaming thread to finish its
    /// cycle and close the sink
    pub fn stop(&mut self) -> Result<()> {
        self.shared.running.store(false, Ordering::Release);

        if let Some(handle) = self.thread_handle.take() {
            let joined = handle.join();
            self.shared.set_state(StreamState::Idle);
            joined.map_err(|_| anyhow::anyhow!("Streaming thread panicked"))?;
            info!("Streaming stopped");
        }

        Ok(())
    }

    pub fn state(&self) -> StreamState {
        StreamState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// True when a thread has been started and not yet stopped
    pub fn is_active(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Whether the sink reached real hardware. Meaningful once the stream has
    /// left the Starting state.
    pub fn is_hardware_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Relaxed)
    }

    /// Cycles completed by the current (or last) stream
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::Relaxed)
    }
}

impl Drop for Streamer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Streaming thread body
fn run_stream_loop(shared: &Shared, target: &str) {
    info!(target = %target, "Streaming started");

    let initial = shared.params.snapshot();
    let mut session = TransmitSession::try_open(shared.backend.as_ref(), target, Tuning::from(&initial));
    shared.connected.store(session.is_connected(), Ordering::Relaxed);
    shared.set_state(StreamState::Running);

    let mut generator = SignalGenerator::new();
    let mut block = vec![IqSample::new(0.0, 0.0); BLOCK_SIZE];

    while shared.running.load(Ordering::Acquire) {
        let params = shared.params.snapshot();

        generator.next_block(&mut block, &params);
        session.apply_tuning(Tuning::from(&params));
        session.send(&block);
        shared.snapshot.publish(&block);

        shared.cycles.fetch_add(1, Ordering::Relaxed);
    }

    shared.set_state(StreamState::Stopping);
    debug!(
        cycles = shared.cycles.load(Ordering::Relaxed),
        send_errors = session.send_errors(),
        "Streaming loop exiting"
    );
    session.close();
}
