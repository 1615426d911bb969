//! Recording sink backend for driving the streaming loop in tests

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::radio::sink::{TxBackend, TxMetadata, TxStream, Tuning};
use crate::types::IqSample;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Open(String),
    Send { len: usize, metadata: TxMetadata },
    Retune(Tuning),
    Release,
}

#[derive(Clone)]
pub struct MockBackend {
    events: Arc<Mutex<Vec<SinkEvent>>>,
    connects: bool,
    fail_sends: bool,
    send_delay: Duration,
    open_delay: Duration,
}

impl MockBackend {
    /// Every open succeeds
    pub fn connecting() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            connects: true,
            fail_sends: false,
            send_delay: Duration::ZERO,
            open_delay: Duration::ZERO,
        }
    }

    /// Every open fails
    pub fn failing() -> Self {
        Self {
            connects: false,
            ..Self::connecting()
        }
    }

    pub fn with_send_failures(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Block inside each non-empty send, like a device draining its buffer
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Block inside open, like a device that is slow to enumerate
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn sends(&self) -> Vec<(usize, TxMetadata)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Send { len, metadata } => Some((*len, *metadata)),
                _ => None,
            })
            .collect()
    }
}

impl TxBackend for MockBackend {
    fn open(&self, target: &str, _tuning: Tuning) -> Result<Box<dyn TxStream>> {
        if !self.open_delay.is_zero() {
            thread::sleep(self.open_delay);
        }
        self.events.lock().push(SinkEvent::Open(target.to_string()));
        if !self.connects {
            anyhow::bail!("No device found for '{}'", target);
        }

        Ok(Box::new(MockStream {
            events: self.events.clone(),
            fail_sends: self.fail_sends,
            send_delay: self.send_delay,
        }))
    }
}

struct MockStream {
    events: Arc<Mutex<Vec<SinkEvent>>>,
    fail_sends: bool,
    send_delay: Duration,
}

impl TxStream for MockStream {
    fn send(&mut self, samples: &[IqSample], metadata: TxMetadata) -> Result<usize> {
        if self.fail_sends {
            anyhow::bail!("Device rejected samples");
        }
        if !samples.is_empty() && !self.send_delay.is_zero() {
            thread::sleep(self.send_delay);
        }

        self.events.lock().push(SinkEvent::Send {
            len: samples.len(),
            metadata,
        });
        Ok(samples.len())
    }

    fn retune(&mut self, tuning: Tuning) -> Result<()> {
        self.events.lock().push(SinkEvent::Retune(tuning));
        Ok(())
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.events.lock().push(SinkEvent::Release);
    }
}
