#![forbid(unsafe_code)]
//! Streaming event extraction for automation-run stdout.
//!
//! A job runner's stdout interleaves human-readable text with invisible,
//! escape-fenced base64+JSON markers. This crate provides:
//! - [`EventFilter`]: splits the stream into `verbose` text events and
//!   marker-decoded events, folding text that follows a correlated marker into
//!   that marker's record.
//! - [`VerboseFilter`]: line-per-event output for jobs that never emit markers.
//! - Pumps that drive either filter from a reader (sync, or tokio behind the
//!   `tokio` feature) and always deliver the terminal `EOF` sentinel.
//!
//! Filters are synchronous and do no I/O; the sink runs inline on the
//! caller's thread.

mod config;
mod decode;
mod emitter;
mod error;
mod event;
mod filter;
mod marker;
mod reader;
mod sink;
mod text;
mod verbose;
mod writer;

pub use config::{FilterConfig, FilterLimits, DEFAULT_CORRELATION_KEY};
pub use decode::{decode_block, decode_block_or_empty};
pub use error::{ConfigError, DecodeError};
pub use event::{DecodedRecord, EofEvent, EventRecord, StreamEvent, EOF_EVENT, VERBOSE_EVENT};
pub use filter::{EventFilter, OutputFilter};
pub use marker::{find_marker, may_complete_marker, MarkerMatch, MARKER_TOKEN};
pub use reader::{pump_reader, PumpSummary};
pub use sink::{ChannelSink, CollectedEvents, EventSink};
pub use verbose::VerboseFilter;
pub use writer::FilterWriter;

#[cfg(feature = "tokio")]
pub use reader::pump_async_reader;

#[cfg(feature = "tokio")]
pub use sink::AsyncChannelSink;
