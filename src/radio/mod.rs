pub mod devices;
pub mod generator;
#[cfg(test)]
pub mod mock;
pub mod params;
pub mod sink;
pub mod snapshot;
pub mod streamer;
pub mod wav_sink;

pub use devices::DeviceRegistry;
pub use params::{ParamSnapshot, SignalParams};
pub use snapshot::SnapshotBuffer;
pub use streamer::Streamer;
