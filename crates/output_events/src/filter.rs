use tracing::{debug, warn};

use crate::config::{FilterConfig, FilterLimits};
use crate::decode::{decode_block_or_empty, is_truthy};
use crate::emitter::Emitter;
use crate::event::DecodedRecord;
use crate::marker::{find_marker, may_complete_marker};
use crate::sink::EventSink;
use crate::text::trailer_start;

/// Anything a stdout reader can feed: chunks in, one `close` at the end.
pub trait OutputFilter {
    fn write(&mut self, chunk: &str);

    /// Flushes the remainder and emits the sentinel. Call exactly once.
    fn close(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Correlation {
    #[default]
    Collecting,
    /// Text is folded into this record until the next marker or `close`.
    Correlating(DecodedRecord),
}

impl Correlation {
    fn pending(&self) -> Option<&DecodedRecord> {
        match self {
            Correlation::Collecting => None,
            Correlation::Correlating(record) => Some(record),
        }
    }

    fn into_pending(self) -> Option<DecodedRecord> {
        match self {
            Correlation::Collecting => None,
            Correlation::Correlating(record) => Some(record),
        }
    }
}

/// Splits a live stdout stream into plain-text and marker-decoded events.
///
/// Text before a marker belongs to the record decoded from the previous
/// marker when that one carried a correlation identifier; otherwise it is
/// emitted line by line as `verbose` events. Markers may be split across any
/// number of `write` calls.
#[derive(Debug)]
pub struct EventFilter<S> {
    emitter: Emitter<S>,
    buffer: String,
    correlation: Correlation,
    correlation_key: String,
    limits: FilterLimits,
}

impl<S: EventSink> EventFilter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, FilterConfig::default())
    }

    pub fn with_config(sink: S, config: FilterConfig) -> Self {
        Self {
            emitter: Emitter::new(sink),
            buffer: String::new(),
            correlation: Correlation::Collecting,
            correlation_key: config.correlation_key,
            limits: config.limits,
        }
    }

    pub fn write(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        let appended_at = self.buffer.len();
        self.buffer.push_str(chunk);
        if may_complete_marker(&self.buffer, appended_at) {
            self.drain_markers();
        }
        self.enforce_limits();
    }

    pub fn close(&mut self) {
        let pending = std::mem::take(&mut self.correlation).into_pending();
        self.emitter.finish(&mut self.buffer, pending);
    }

    /// Last counter handed out; 0 before the first event.
    pub fn counter(&self) -> u64 {
        self.emitter.counter()
    }

    /// Lines consumed so far, i.e. the next event's `start_line`.
    pub fn line_cursor(&self) -> u64 {
        self.emitter.line_cursor()
    }

    pub fn is_correlating(&self) -> bool {
        self.correlation.pending().is_some()
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    pub fn into_sink(self) -> S {
        self.emitter.into_sink()
    }

    fn drain_markers(&mut self) {
        let mut consumed = 0;
        while let Some(found) = find_marker(&self.buffer[consumed..]) {
            let record = decode_block_or_empty(found.payload);
            let start = consumed + found.span.start;
            let end = consumed + found.span.end;

            let next = if is_truthy(record.get(&self.correlation_key)) {
                Correlation::Correlating(record)
            } else {
                Correlation::Collecting
            };
            let pending = std::mem::replace(&mut self.correlation, next).into_pending();
            self.emitter.emit_span(&self.buffer[consumed..start], pending);
            debug!(
                counter = self.emitter.counter(),
                correlating = self.correlation.pending().is_some(),
                "resolved event marker"
            );
            consumed = end;
        }
        self.buffer.replace_range(..consumed, "");
    }

    fn enforce_limits(&mut self) {
        let Some(max) = self.limits.max_buffer_bytes else {
            return;
        };
        if self.buffer.len() <= max {
            return;
        }
        warn!(
            buffered_bytes = self.buffer.len(),
            max_buffer_bytes = max,
            "output buffer exceeded limit; flushing without waiting for a marker"
        );
        match self.correlation.pending() {
            Some(payload) => {
                // The last two characters may be the trailer of this span.
                let tail = self.buffer.split_off(trailer_start(&self.buffer));
                let span = std::mem::replace(&mut self.buffer, tail);
                if !span.is_empty() {
                    self.emitter.emit_partial(&span, payload.clone());
                }
            }
            None => {
                let span = std::mem::take(&mut self.buffer);
                self.emitter.emit_span(&span, None);
            }
        }
    }
}

impl<S: EventSink> OutputFilter for EventFilter<S> {
    fn write(&mut self, chunk: &str) {
        EventFilter::write(self, chunk)
    }

    fn close(&mut self) {
        EventFilter::close(self)
    }
}
