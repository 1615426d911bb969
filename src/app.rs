use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, DeviceEntry, AMPLITUDE_RANGE, FREQUENCY_RANGE, GAIN_RANGE};
use crate::radio::sink::TxBackend;
use crate::radio::{SignalParams, SnapshotBuffer, Streamer};
use crate::scope::DisplaySampler;
use crate::types::{StreamState, STATUS_GRACE};

/// Frequency step per key press in edit mode (Hz)
const FREQUENCY_STEP: f64 = 1e6;

/// Gain step per key press in edit mode (dB)
const GAIN_STEP: f64 = 1.0;

/// Amplitude step per key press in edit mode
const AMPLITUDE_STEP: f64 = 0.1;

/// Message type for user notifications
#[derive(Debug, Clone)]
pub enum MessageType {
    Warning,
    Error,
}

/// User notification message
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub msg_type: MessageType,
    pub timestamp: Instant,
}

/// Row in the control deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Device,
    Frequency,
    Gain,
    Amplitude,
    Waveform,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Field::Device,
            Field::Frequency,
            Field::Gain,
            Field::Amplitude,
            Field::Waveform,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Device => "Device",
            Field::Frequency => "Center Freq",
            Field::Gain => "TX Gain",
            Field::Amplitude => "Amplitude",
            Field::Waveform => "Waveform",
        }
    }
}

/// What the status line shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Standby,
    /// Waiting out the grace period before reading the connection flag
    Starting(Instant),
    TxActive,
    Simulation,
}

/// Main application state
pub struct App {
    /// Generation/streaming loop
    pub streamer: Streamer,

    /// Shared signal settings
    pub params: Arc<SignalParams>,

    /// Latest block, shared with the streaming thread
    pub snapshot: Arc<SnapshotBuffer>,

    /// Scope sampler
    pub sampler: DisplaySampler,

    /// Selectable devices (simulation first)
    pub devices: Vec<DeviceEntry>,

    /// Index of the selected device
    pub selected_device: usize,

    /// Selected control deck row
    pub selected_field: Field,

    /// Whether we're in edit mode
    pub edit_mode: bool,

    /// Connection status for display
    pub link_status: LinkStatus,

    /// When the current stream was started
    pub stream_start_time: Option<Instant>,

    /// Whether to exit the application
    pub should_quit: bool,

    /// Current message to display (if any)
    pub message: Option<Message>,

    /// Message display duration
    pub message_duration: Duration,

    /// Whether to show help view
    pub show_help: bool,
}

impl App {
    /// Create a new application
    pub fn new(config: &Config, device_selector: Option<&str>, backend: Arc<dyn TxBackend>) -> Self {
        let params = Arc::new(SignalParams::new(config.signal.to_snapshot()));
        let snapshot = Arc::new(SnapshotBuffer::new());
        let streamer = Streamer::new(params.clone(), snapshot.clone(), backend);
        let sampler = DisplaySampler::new(
            snapshot.clone(),
            config.display.refresh(),
            config.display.max_points,
        );
        let (devices, selected_device) = config.select_device(device_selector);

        Self {
            streamer,
            params,
            snapshot,
            sampler,
            devices,
            selected_device,
            selected_field: Field::Device,
            edit_mode: false,
            link_status: LinkStatus::Standby,
            stream_start_time: None,
            should_quit: false,
            message: None,
            message_duration: Duration::from_secs(3),
            show_help: false,
        }
    }

    /// Currently selected device
    pub fn device(&self) -> &DeviceEntry {
        &self.devices[self.selected_device]
    }

    /// Move selection up (previous row or increase value)
    pub fn move_up(&mut self) {
        if self.edit_mode {
            self.adjust(1.0);
            return;
        }

        let fields = Field::all();
        if let Some(idx) = fields.iter().position(|f| *f == self.selected_field) {
            if idx > 0 {
                self.selected_field = fields[idx - 1];
            }
        }
    }

    /// Move selection down (next row or decrease value)
    pub fn move_down(&mut self) {
        if self.edit_mode {
            self.adjust(-1.0);
            return;
        }

        let fields = Field::all();
        if let Some(idx) = fields.iter().position(|f| *f == self.selected_field) {
            if idx < fields.len() - 1 {
                self.selected_field = fields[idx + 1];
            }
        }
    }

    /// Decrease the selected value in edit mode
    pub fn move_left(&mut self) {
        if self.edit_mode {
            self.adjust(-1.0);
        }
    }

    /// Increase the selected value in edit mode
    pub fn move_right(&mut self) {
        if self.edit_mode {
            self.adjust(1.0);
        }
    }

    /// Activate the selected row: toggle waveform or enter/leave edit mode
    pub fn activate(&mut self) {
        match self.selected_field {
            Field::Waveform => {
                self.params.set_waveform(self.params.waveform().toggled());
            }
            Field::Device if self.streamer.is_active() => {
                self.show_warning("Stop the stream before changing device");
            }
            _ => {
                self.edit_mode = !self.edit_mode;
            }
        }
    }

    /// Leave edit mode
    pub fn cancel_edit(&mut self) {
        self.edit_mode = false;
    }

    /// Step the selected value by `direction` steps, clamped to the accepted range
    fn adjust(&mut self, direction: f64) {
        match self.selected_field {
            Field::Device => self.cycle_device(direction),
            Field::Frequency => {
                let value = step(self.params.frequency(), direction * FREQUENCY_STEP, FREQUENCY_RANGE);
                self.params.set_frequency(value);
            }
            Field::Gain => {
                let value = step(self.params.gain(), direction * GAIN_STEP, GAIN_RANGE);
                self.params.set_gain(value);
            }
            Field::Amplitude => {
                // Round to nearest 0.1 to avoid floating point drift
                let value = step(self.params.amplitude(), direction * AMPLITUDE_STEP, AMPLITUDE_RANGE);
                self.params.set_amplitude((value * 10.0).round() / 10.0);
            }
            Field::Waveform => {
                self.params.set_waveform(self.params.waveform().toggled());
            }
        }
    }

    fn cycle_device(&mut self, direction: f64) {
        if self.streamer.is_active() {
            self.show_warning("Stop the stream before changing device");
            return;
        }

        let count = self.devices.len();
        self.selected_device = if direction > 0.0 {
            (self.selected_device + 1) % count
        } else {
            (self.selected_device + count - 1) % count
        };
    }

    /// Start streaming to the selected device, or stop (and join) if running
    pub fn toggle_stream(&mut self) {
        if self.streamer.is_active() {
            if let Err(e) = self.streamer.stop() {
                self.show_error(format!("Failed to stop stream: {}", e));
            }
            self.link_status = LinkStatus::Standby;
            self.stream_start_time = None;
            return;
        }

        self.edit_mode = false;
        let target = self.device().target.clone();
        match self.streamer.start(&target) {
            Ok(()) => {
                self.link_status = LinkStatus::Starting(Instant::now());
                self.stream_start_time = Some(Instant::now());
            }
            Err(e) => self.show_error(format!("Failed to start stream: {}", e)),
        }
    }

    /// Resolve the connection status once the grace period has passed and
    /// the open attempt has finished
    pub fn update_link_status(&mut self) {
        if let LinkStatus::Starting(since) = self.link_status {
            if since.elapsed() < STATUS_GRACE || self.streamer.state() == StreamState::Starting {
                return;
            }

            self.link_status = if self.streamer.is_hardware_connected() {
                LinkStatus::TxActive
            } else {
                LinkStatus::Simulation
            };

            if self.link_status == LinkStatus::Simulation && !self.device().target.is_empty() {
                let name = self.device().name.clone();
                self.show_warning(format!("Could not open '{}', simulating", name));
            }
        }
    }

    /// Periodic work between frames
    pub fn tick(&mut self) {
        self.sampler.poll();
        self.update_link_status();
        self.update_message();
    }

    /// Clear message if it has expired
    pub fn update_message(&mut self) {
        if let Some(ref msg) = self.message {
            if msg.timestamp.elapsed() > self.message_duration {
                self.message = None;
            }
        }
    }

    /// Show a warning message
    pub fn show_warning(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            msg_type: MessageType::Warning,
            timestamp: Instant::now(),
        });
    }

    /// Show an error message
    pub fn show_error(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            msg_type: MessageType::Error,
            timestamp: Instant::now(),
        });
    }

    /// Status label for the status line
    pub fn link_status_str(&self) -> &'static str {
        match self.link_status {
            LinkStatus::Standby => "STANDBY",
            LinkStatus::Starting(_) => "STARTING",
            LinkStatus::TxActive => "TX ACTIVE",
            LinkStatus::Simulation => "SIMULATION",
        }
    }

    /// Get stream duration string
    pub fn stream_duration_str(&self) -> String {
        if let Some(start_time) = self.stream_start_time {
            let secs = start_time.elapsed().as_secs();
            let hours = secs / 3600;
            let minutes = (secs % 3600) / 60;
            let seconds = secs % 60;

            if hours > 0 {
                format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
            } else {
                format!("{:02}:{:02}", minutes, seconds)
            }
        } else {
            "-".to_string()
        }
    }

    /// Loop state, for display
    pub fn stream_state(&self) -> StreamState {
        self.streamer.state()
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Toggle help view
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Ensure the sink is closed before exit
        let _ = self.streamer.stop();
    }
}

fn step(current: f64, delta: f64, range: (f64, f64)) -> f64 {
    (current + delta).clamp(range.0, range.1)
}
