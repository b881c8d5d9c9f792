use tracing::{debug, trace};

use crate::event::{DecodedRecord, EofEvent, EventRecord, StreamEvent};
use crate::sink::EventSink;
use crate::text::{count_newlines, line_fragments, strip_trailer};

/// Counter and line bookkeeping shared by both filters; the only place event
/// records are built.
#[derive(Debug)]
pub(crate) struct Emitter<S> {
    sink: S,
    counter: u64,
    line_cursor: u64,
}

impl<S: EventSink> Emitter<S> {
    pub(crate) fn new(sink: S) -> Self {
        Self {
            sink,
            counter: 0,
            line_cursor: 0,
        }
    }

    pub(crate) fn counter(&self) -> u64 {
        self.counter
    }

    pub(crate) fn line_cursor(&self) -> u64 {
        self.line_cursor
    }

    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn into_sink(self) -> S {
        self.sink
    }

    /// Emits `span` as one correlated event when `pending` is set, otherwise
    /// as one verbose event per line fragment. An empty span with nothing
    /// pending emits nothing.
    pub(crate) fn emit_span(&mut self, span: &str, pending: Option<DecodedRecord>) {
        match pending {
            Some(payload) => {
                let (start_line, end_line) = self.advance_lines(span);
                let counter = self.next_counter();
                self.dispatch(EventRecord::correlated(
                    payload,
                    counter,
                    strip_trailer(span),
                    start_line,
                    end_line,
                ));
            }
            None => {
                for fragment in line_fragments(span) {
                    let (start_line, end_line) = self.advance_lines(fragment);
                    let counter = self.next_counter();
                    self.dispatch(EventRecord::verbose(
                        counter,
                        fragment.to_string(),
                        start_line,
                        end_line,
                    ));
                }
            }
        }
    }

    /// Emits part of a correlated span ahead of its boundary. The trailer only
    /// ends a span, so `stdout` keeps every character here.
    pub(crate) fn emit_partial(&mut self, span: &str, payload: DecodedRecord) {
        let (start_line, end_line) = self.advance_lines(span);
        let counter = self.next_counter();
        self.dispatch(EventRecord::correlated(
            payload,
            counter,
            span.to_string(),
            start_line,
            end_line,
        ));
    }

    /// End-of-stream handling common to both filters: flush what is left of
    /// `buffer`, then the sentinel.
    pub(crate) fn finish(&mut self, buffer: &mut String, pending: Option<DecodedRecord>) {
        if !buffer.is_empty() {
            let rest = std::mem::take(buffer);
            self.emit_span(&rest, pending);
        } else if pending.is_some() {
            debug!(
                counter = self.counter,
                "stream closed with no output after the last correlated marker"
            );
        }
        debug!(final_counter = self.counter, "output stream closed");
        self.sink.on_event(StreamEvent::Eof(EofEvent {
            final_counter: self.counter,
        }));
    }

    fn next_counter(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn advance_lines(&mut self, consumed: &str) -> (u64, u64) {
        let start_line = self.line_cursor;
        self.line_cursor += count_newlines(consumed);
        (start_line, self.line_cursor)
    }

    fn dispatch(&mut self, record: EventRecord) {
        trace!(
            counter = record.counter(),
            event = record.event().unwrap_or_default(),
            start_line = record.start_line(),
            end_line = record.end_line(),
            "emitting output event"
        );
        self.sink.on_event(StreamEvent::Record(record));
    }
}
