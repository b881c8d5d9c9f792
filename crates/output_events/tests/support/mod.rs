#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use output_events::{CollectedEvents, EventFilter, EventRecord};
use serde_json::Value;

/// Encodes `payload` the way the job display callback does: base64 runs of
/// `width` characters, each followed by a cursor-left move over itself.
pub fn marker_with_width(payload: &Value, width: usize) -> String {
    let encoded = general_purpose::STANDARD.encode(payload.to_string());
    let mut out = String::from("\x1b[K");
    for run in encoded.as_bytes().chunks(width) {
        let run = std::str::from_utf8(run).unwrap();
        out.push_str(run);
        out.push_str(&format!("\x1b[{}D", run.len()));
    }
    out.push_str("\x1b[K");
    out
}

pub fn marker(payload: &Value) -> String {
    marker_with_width(payload, 8)
}

/// Splits on char boundaries into pieces of at most `size` chars.
pub fn chunks_of(stream: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = stream.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Deterministic uneven chunking (1..=max chars per piece).
pub fn jittered_chunks(stream: &str, seed: u64, max: usize) -> Vec<String> {
    let chars: Vec<char> = stream.chars().collect();
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < chars.len() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let len = 1 + ((state >> 33) as usize % max.max(1));
        let end = (idx + len).min(chars.len());
        out.push(chars[idx..end].iter().collect());
        idx = end;
    }
    out
}

pub fn run_filter<I, S>(chunks: I) -> CollectedEvents
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut filter = EventFilter::new(CollectedEvents::default());
    for chunk in chunks {
        filter.write(chunk.as_ref());
    }
    filter.close();
    filter.into_sink()
}

pub fn summary(record: &EventRecord) -> (u64, String, u64, u64) {
    (
        record.counter(),
        record.stdout().to_string(),
        record.start_line(),
        record.end_line(),
    )
}
