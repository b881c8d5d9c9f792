mod sync;

#[cfg(feature = "tokio")]
mod async_pump;

pub use sync::pump_reader;

#[cfg(feature = "tokio")]
pub use async_pump::pump_async_reader;

const CHUNK_SIZE_BYTES: usize = 8192;

/// What a pump moved before the stream ended.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct PumpSummary {
    pub bytes_read: u64,
    pub chunks: u64,
}
