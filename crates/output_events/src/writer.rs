use std::io;

use crate::filter::OutputFilter;
use crate::text::Utf8Carry;

/// Byte-level front end for a filter, for callers that already hold an
/// `io::Write` target (`io::copy` from a child pipe, a tee, a pty logger).
///
/// Reads may split multi-byte characters; they are reassembled before the
/// text reaches the filter. There is no underlying file, so `flush` does
/// nothing. Call [`FilterWriter::finish`] at end of stream.
#[derive(Debug)]
pub struct FilterWriter<F> {
    filter: F,
    carry: Utf8Carry,
}

impl<F: OutputFilter> FilterWriter<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            carry: Utf8Carry::default(),
        }
    }

    pub fn get_ref(&self) -> &F {
        &self.filter
    }

    /// Flushes held bytes, closes the filter and hands it back.
    pub fn finish(mut self) -> F {
        let rest = self.carry.finish();
        if !rest.is_empty() {
            self.filter.write(&rest);
        }
        self.filter.close();
        self.filter
    }
}

impl<F: OutputFilter> io::Write for FilterWriter<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = self.carry.decode(buf);
        if !text.is_empty() {
            self.filter.write(&text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
