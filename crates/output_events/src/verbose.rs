use tracing::warn;

use crate::config::FilterLimits;
use crate::emitter::Emitter;
use crate::filter::OutputFilter;
use crate::sink::EventSink;
use crate::text::complete_lines_len;

/// Line-by-line `verbose` events for jobs whose output never carries markers.
///
/// A chunk containing `\n` releases every complete line in the buffer. Lines
/// also end at `\r` and the other Unicode line boundaries, but a last line
/// without a `\n` waits for the next such chunk or for `close`.
#[derive(Debug)]
pub struct VerboseFilter<S> {
    emitter: Emitter<S>,
    buffer: String,
    limits: FilterLimits,
}

impl<S: EventSink> VerboseFilter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_limits(sink, FilterLimits::default())
    }

    pub fn with_limits(sink: S, limits: FilterLimits) -> Self {
        Self {
            emitter: Emitter::new(sink),
            buffer: String::new(),
            limits,
        }
    }

    pub fn write(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
        if chunk.contains('\n') {
            let partial = self.buffer.split_off(complete_lines_len(&self.buffer));
            let lines = std::mem::replace(&mut self.buffer, partial);
            self.emitter.emit_span(&lines, None);
        }
        if let Some(max) = self.limits.max_buffer_bytes {
            if self.buffer.len() > max {
                warn!(
                    buffered_bytes = self.buffer.len(),
                    max_buffer_bytes = max,
                    "partial line exceeded limit; emitting it early"
                );
                let partial = std::mem::take(&mut self.buffer);
                self.emitter.emit_span(&partial, None);
            }
        }
    }

    pub fn close(&mut self) {
        self.emitter.finish(&mut self.buffer, None);
    }

    pub fn counter(&self) -> u64 {
        self.emitter.counter()
    }

    pub fn line_cursor(&self) -> u64 {
        self.emitter.line_cursor()
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
}

impl<S: EventSink> OutputFilter for VerboseFilter<S> {
    fn write(&mut self, chunk: &str) {
        VerboseFilter::write(self, chunk)
    }

    fn close(&mut self) {
        VerboseFilter::close(self)
    }
}
