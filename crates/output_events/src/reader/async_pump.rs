use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use super::{PumpSummary, CHUNK_SIZE_BYTES};
use crate::filter::OutputFilter;
use crate::text::Utf8Carry;

/// Async twin of [`pump_reader`](super::pump_reader) for a child's piped
/// stdout. The filter itself stays synchronous; only the reads await.
pub async fn pump_async_reader<R, F>(mut reader: R, filter: &mut F) -> io::Result<PumpSummary>
where
    R: AsyncRead + Unpin,
    F: OutputFilter + ?Sized,
{
    let mut chunk = vec![0u8; CHUNK_SIZE_BYTES];
    let mut carry = Utf8Carry::default();
    let mut summary = PumpSummary::default();

    let outcome = loop {
        match reader.read(&mut chunk).await {
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
