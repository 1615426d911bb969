use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::radio::ParamSnapshot;
use crate::types::{
    Waveform, BLOCK_SIZE, DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY, DEFAULT_GAIN, DISPLAY_REFRESH,
    MAX_PLOT_POINTS,
};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "txscope.yaml";

/// Name of the built-in device entry with an empty target
pub const SIMULATION_DEVICE: &str = "Simulation";

/// Center frequency span accepted by the control surface (Hz)
pub const FREQUENCY_RANGE: (f64, f64) = (70e6, 6e9);

/// Transmit gain span accepted by the control surface (dB)
pub const GAIN_RANGE: (f64, f64) = (0.0, 89.0);

/// Amplitude span accepted by the control surface
pub const AMPLITUDE_RANGE: (f64, f64) = (0.0, 1.0);

/// Top-level configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub devices: DeviceConfig,

    #[serde(default)]
    pub signal: SignalConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Log file used while the terminal UI owns the screen
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Transmit device configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Name of the device selected at startup
    #[serde(default)]
    pub default: Option<String>,

    /// Selectable device targets, in addition to the built-in simulation entry
    #[serde(default)]
    pub list: Vec<DeviceEntry>,
}

/// A named device target descriptor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceEntry {
    pub name: String,
    pub target: String,
}

/// Initial signal settings
#[derive(Debug, Deserialize, Serialize)]
pub struct SignalConfig {
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    #[serde(default = "default_gain")]
    pub gain: f64,

    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    #[serde(default)]
    pub waveform: Waveform,
}

/// Scope display settings
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY
}

fn default_gain() -> f64 {
    DEFAULT_GAIN
}

fn default_amplitude() -> f64 {
    DEFAULT_AMPLITUDE
}

fn default_refresh_ms() -> u64 {
    DISPLAY_REFRESH.as_millis() as u64
}

fn default_max_points() -> usize {
    MAX_PLOT_POINTS
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            gain: default_gain(),
            amplitude: default_amplitude(),
            waveform: Waveform::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
            max_points: default_max_points(),
        }
    }
}

impl SignalConfig {
    pub fn to_snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            frequency_hz: self.frequency,
            gain_db: self.gain,
            amplitude: self.amplitude,
            waveform: self.waveform,
        }
    }
}

impl DisplayConfig {
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults only when the default file
    /// is absent
    pub fn load(path: &str) -> Result<Self> {
        let file = Path::new(path);

        if !file.exists() {
            if path == DEFAULT_CONFIG_FILE {
                return Ok(Config::default());
            }
            anyhow::bail!("Config file not found: {}", path);
        }

        Self::from_file(file)
    }

    /// All selectable devices, simulation first
    pub fn device_entries(&self) -> Vec<DeviceEntry> {
        let mut entries = vec![DeviceEntry {
            name: SIMULATION_DEVICE.to_string(),
            target: String::new(),
        }];
        entries.extend(self.devices.list.iter().cloned());
        entries
    }

    /// Index into [`Config::device_entries`] of the device named by `selector`
    /// (or the configured default). A selector that matches no name is taken
    /// as a raw target and appended.
    pub fn select_device(&self, selector: Option<&str>) -> (Vec<DeviceEntry>, usize) {
        let mut entries = self.device_entries();

        let Some(wanted) = selector.or(self.devices.default.as_deref()) else {
            return (entries, 0);
        };

        let wanted_lower = wanted.to_lowercase();
        if let Some(index) = entries
            .iter()
            .position(|entry| entry.name.to_lowercase() == wanted_lower)
        {
            return (entries, index);
        }

        entries.push(DeviceEntry {
            name: wanted.to_string(),
            target: wanted.to_string(),
        });
        let index = entries.len() - 1;
        (entries, index)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let signal = &self.signal;

        check_range("Frequency", signal.frequency, FREQUENCY_RANGE)?;
        check_range("Gain", signal.gain, GAIN_RANGE)?;
        check_range("Amplitude", signal.amplitude, AMPLITUDE_RANGE)?;

        if !(1..=1000).contains(&self.display.refresh_ms) {
            anyhow::bail!(
                "Display refresh must be between 1 and 1000 ms, got {}",
                self.display.refresh_ms
            );
        }

        if !(1..=BLOCK_SIZE).contains(&self.display.max_points) {
            anyhow::bail!(
                "Display max_points must be between 1 and {}, got {}",
                BLOCK_SIZE,
                self.display.max_points
            );
        }

        for entry in &self.devices.list {
            if entry.name.trim().is_empty() {
                anyhow::bail!("Device entry with target '{}' has no name", entry.target);
            }
            if entry.name.eq_ignore_ascii_case(SIMULATION_DEVICE) {
                anyhow::bail!("Device name '{}' is reserved", entry.name);
            }
        }

        if let Some(ref default) = self.devices.default {
            let known = default.eq_ignore_ascii_case(SIMULATION_DEVICE)
                || self
                    .devices
                    .list
                    .iter()
                    .any(|entry| entry.name.eq_ignore_ascii_case(default));
            if !known {
                anyhow::bail!("Default device '{}' is not in the device list", default);
            }
        }

        Ok(())
    }
}

/// Bail unless `value` lies within `range` (inclusive)
pub fn check_range(name: &str, value: f64, range: (f64, f64)) -> Result<()> {
    let (min, max) = range;
    if !(min..=max).contains(&value) {
        anyhow::bail!("{} must be between {} and {}, got {}", name, min, max, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.signal.frequency, 915e6);
        assert_eq!(config.signal.gain, 40.0);
        assert_eq!(config.signal.amplitude, 1.0);
        assert_eq!(config.signal.waveform, Waveform::Sine);
        assert_eq!(config.display.refresh(), Duration::from_millis(33));
        assert_eq!(config.display.max_points, 500);
        assert_eq!(config.device_entries().len(), 1);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
devices:
  default: capture
  list:
    - name: capture
      target: "wav:captures/tx-{timestamp}.wav"
    - name: b210
      target: "type=b200,serial=31A3F2"
signal:
  frequency: 2.4e9
  gain: 60
  amplitude: 0.5
  waveform: square
display:
  refresh_ms: 50
  max_points: 250
log_file: /tmp/txscope.log
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let snap = config.signal.to_snapshot();
        assert_eq!(snap.frequency_hz, 2.4e9);
        assert_eq!(snap.waveform, Waveform::Square);
        assert_eq!(config.display.max_points, 250);

        let (entries, index) = config.select_device(None);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[index].name, "capture");

        let (entries, index) = config.select_device(Some("B210"));
        assert_eq!(entries[index].target, "type=b200,serial=31A3F2");
    }

    #[test]
    fn test_raw_target_selector() {
        let config = Config::default();
        let (entries, index) = config.select_device(Some("wav:out.wav"));
        assert_eq!(index, 1);
        assert_eq!(entries[index].target, "wav:out.wav");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(Config::from_yaml("signal:\n  amplitude: 1.5\n").is_err());
        assert!(Config::from_yaml("signal:\n  frequency: 1e6\n").is_err());
        assert!(Config::from_yaml("signal:\n  gain: 90\n").is_err());
        assert!(Config::from_yaml("display:\n  max_points: 0\n").is_err());
        assert!(Config::from_yaml("display:\n  refresh_ms: 5000\n").is_err());
    }

    #[test]
    fn test_unknown_waveform_rejected() {
        assert!(Config::from_yaml("signal:\n  waveform: triangle\n").is_err());
    }

    #[test]
    fn test_default_device_must_exist() {
        assert!(Config::from_yaml("devices:\n  default: x310\n").is_err());
        assert!(Config::from_yaml("devices:\n  default: simulation\n").is_ok());
    }

    #[test]
    fn test_load_rules() {
        // Missing explicit file is an error
        assert!(Config::load("/nonexistent/txscope-test.yaml").is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "signal:\n  gain: 10").unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.signal.gain, 10.0);
    }
}
