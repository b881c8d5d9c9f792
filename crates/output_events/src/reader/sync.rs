use std::io::{self, Read};

use tracing::{debug, warn};

use super::{PumpSummary, CHUNK_SIZE_BYTES};
use crate::filter::OutputFilter;
use crate::text::Utf8Carry;

/// Feeds everything `reader` yields into `filter`, then closes it.
///
/// The filter is closed exactly once whether the stream ends cleanly or with
/// a read error, so the sentinel always reaches the sink; the error is
/// returned afterwards.
pub fn pump_reader<R, F>(mut reader: R, filter: &mut F) -> io::Result<PumpSummary>
where
    R: Read,
    F: OutputFilter + ?Sized,
{
    let mut chunk = [0u8; CHUNK_SIZE_BYTES];
    let mut carry = Utf8Carry::default();
    let mut summary = PumpSummary::default();

    let outcome = loop {
        match reader.read(&mut chunk) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                summary.bytes_read += n as u64;
                summary.chunks += 1;
                filter.write(&carry.decode(&chunk[..n]));
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => break Err(err),
        }
    };

    let rest = carry.finish();
    if !rest.is_empty() {
        filter.write(&rest);
    }
    filter.close();

    match outcome {
        Ok(()) => {
            debug!(
                bytes = summary.bytes_read,
                chunks = summary.chunks,
                "output stream drained"
            );
            Ok(summary)
        }
        Err(error) => {
            warn!(
                ?error,
                bytes = summary.bytes_read,
                "output stream failed; filter closed early"
            );
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EofEvent;
    use crate::sink::CollectedEvents;
    use crate::VerboseFilter;

    struct FailAfter {
        data: &'static [u8],
        served: bool,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "child went away"));
            }
            self.served = true;
            buf[..self.data.len()].copy_from_slice(self.data);
            Ok(self.data.len())
        }
    }

    #[test]
    fn read_error_still_closes_filter() {
        let mut filter = VerboseFilter::new(CollectedEvents::default());
        let reader = FailAfter {
            data: b"line\npartial",
            served: false,
        };
        let err = pump_reader(reader, &mut filter).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let stdout: Vec<_> = filter.sink().records().map(|r| r.stdout()).collect();
        assert_eq!(stdout, ["line\n", "partial"]);
        assert_eq!(filter.sink().eof(), Some(EofEvent { final_counter: 2 }));
    }

    #[test]
    fn counts_bytes_and_chunks() {
        let mut filter = VerboseFilter::new(CollectedEvents::default());
        let data = vec![b'x'; CHUNK_SIZE_BYTES + 10];
        let summary = pump_reader(std::io::Cursor::new(data), &mut filter).unwrap();
        assert_eq!(summary.bytes_read, CHUNK_SIZE_BYTES as u64 + 10);
        assert_eq!(summary.chunks, 2);
        assert_eq!(filter.counter(), 1);
    }
}
