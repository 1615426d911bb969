mod app;
mod config;
mod logging;
mod radio;
mod scope;
mod types;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::app::App;
use crate::config::{Config, DEFAULT_CONFIG_FILE, SIMULATION_DEVICE};
use crate::radio::{DeviceRegistry, SignalParams, SnapshotBuffer, Streamer};
use crate::types::{StreamState, STATUS_GRACE};
use crate::ui::{handle_input, render_ui};

/// txscope - I/Q transmit generator
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Terminal I/Q waveform generator with live time-domain scope",
    long_about = "Terminal I/Q waveform generator with live time-domain scope.\n\n\
                  Synthesizes a sine or square baseband tone at 1 MHz and streams it \
                  to a transmit device (or simulates one), while plotting the most \
                  recent samples.\n\n\
                  Configuration is loaded from txscope.yaml by default, or use --config \
                  to specify a different file."
)]
struct Args {
    /// List configured transmit devices
    #[arg(short, long)]
    list_devices: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Device name from the config, or a raw device target
    #[arg(short, long, value_name = "NAME|TARGET")]
    device: Option<String>,

    /// Stream without the terminal UI
    #[arg(long)]
    headless: bool,

    /// Seconds to stream in headless mode
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    duration: u64,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Handle --list-devices flag
    if args.list_devices {
        list_devices(&config);
        return Ok(());
    }

    if args.headless {
        logging::init_stderr();
        return run_headless(&config, args.device.as_deref(), args.duration);
    }

    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(logging::DEFAULT_LOG_FILE));
    logging::init_file(&log_file)?;
    info!(config = %args.config, "txscope starting");

    let backend = Arc::new(DeviceRegistry::new());
    let mut app = App::new(&config, args.device.as_deref(), backend);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app, config.display.refresh());

    // Stop streaming before handing the terminal back
    if let Err(e) = app.streamer.stop() {
        tracing::error!(error = %e, "Failed to stop stream on exit");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// List configured transmit devices
fn list_devices(config: &Config) {
    println!("txscope - transmit devices");
    println!("==========================");
    println!();

    let default = config.devices.default.as_deref().unwrap_or(SIMULATION_DEVICE);
    for (i, entry) in config.device_entries().iter().enumerate() {
        let default_marker = if entry.name.eq_ignore_ascii_case(default) {
            " [DEFAULT]"
        } else {
            ""
        };
        let target = if entry.target.is_empty() {
            "(none)"
        } else {
            entry.target.as_str()
        };
        println!(
            "  [{}] {} - {} ({}){}",
            i,
            entry.name,
            target,
            DeviceRegistry::driver_name(&entry.target),
            default_marker
        );
    }

    println!();
    println!("Configuration:");
    println!("  Create a txscope.yaml file to configure devices and the initial signal");
    println!("  Use --config <path> to specify a different config file");
    println!();
    println!("Example txscope.yaml:");
    println!("  devices:");
    println!("    default: capture");
    println!("    list:");
    println!("      - name: capture");
    println!("        target: \"wav:captures/tx-{{timestamp}}.wav\"");
    println!();
    println!("  signal:");
    println!("    frequency: 915e6");
    println!("    gain: 40");
    println!("    amplitude: 1.0");
    println!("    waveform: sine");
    println!();
    println!("  display:");
    println!("    refresh_ms: 33");
    println!("    max_points: 500");
}

/// Main application loop
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    refresh: Duration,
) -> Result<()> {
    loop {
        // Pull a fresh snapshot, resolve link status, expire messages
        app.tick();

        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle input
        handle_input(app, refresh)?;

        // Check for quit
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Stream for `duration_secs` without the terminal UI, printing status once a second
fn run_headless(config: &Config, device: Option<&str>, duration_secs: u64) -> Result<()> {
    if duration_secs == 0 {
        anyhow::bail!("Headless duration must be greater than 0 seconds");
    }

    let (devices, index) = config.select_device(device);
    let entry = &devices[index];

    let params = Arc::new(SignalParams::new(config.signal.to_snapshot()));
    let snapshot = Arc::new(SnapshotBuffer::new());
    let mut streamer = Streamer::new(params, snapshot.clone(), Arc::new(DeviceRegistry::new()));

    println!("txscope - streaming to '{}' for {}s", entry.name, duration_secs);
    streamer
        .start(&entry.target)
        .with_context(|| format!("Failed to start stream on '{}'", entry.name))?;

    thread::sleep(STATUS_GRACE);
    while streamer.state() == StreamState::Starting {
        thread::sleep(Duration::from_millis(10));
    }
    let mode = if streamer.is_hardware_connected() {
        "hardware"
    } else {
        "simulated"
    };
    println!("  link: {}", mode);

    let started = Instant::now();
    let duration = Duration::from_secs(duration_secs);
    while started.elapsed() < duration {
        thread::sleep(Duration::from_secs(1).min(duration.saturating_sub(started.elapsed())));
        println!(
            "  state: {:?}; cycles: {}; snapshots: {}; dropped: {}",
            streamer.state(),
            streamer.cycles(),
            snapshot.published(),
            snapshot.dropped()
        );
    }

    streamer.stop()?;

    println!();
    println!("Done: {} blocks ({} link)", streamer.cycles(), mode);

    Ok(())
}
