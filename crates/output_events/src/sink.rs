use tracing::debug;

use crate::event::{EofEvent, EventRecord, StreamEvent};

/// Receives every event a filter emits, in order, ending with one sentinel.
///
/// Called synchronously from inside `write`/`close` on the reader's thread: a
/// sink that blocks stalls consumption of the child's output. Panics are not
/// caught and unwind through the filter to its caller.
pub trait EventSink {
    fn on_event(&mut self, event: StreamEvent);
}

impl<F> EventSink for F
where
    F: FnMut(StreamEvent),
{
    fn on_event(&mut self, event: StreamEvent) {
        self(event)
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedEvents(pub Vec<StreamEvent>);

impl CollectedEvents {
    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.0.iter().filter_map(StreamEvent::as_record)
    }

    /// The sentinel, once the stream has been closed.
    pub fn eof(&self) -> Option<EofEvent> {
        self.0.iter().find_map(|event| match event {
            StreamEvent::Eof(eof) => Some(*eof),
            StreamEvent::Record(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl EventSink for CollectedEvents {
    fn on_event(&mut self, event: StreamEvent) {
        self.0.push(event);
    }
}

/// Forwards events to another thread over a std channel.
///
/// A dropped receiver is not an error for the stream: the event is discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: std::sync::mpsc::Sender<StreamEvent>,
}

impl ChannelSink {
    pub fn new(sender: std::sync::mpsc::Sender<StreamEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn on_event(&mut self, event: StreamEvent) {
        if self.sender.send(event).is_err() {
            debug!("event receiver dropped; discarding event");
        }
    }
}

/// Forwards events into a tokio task without blocking the reader.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct AsyncChannelSink {
    sender: tokio::sync::mpsc::UnboundedSender<StreamEvent>,
}

#[cfg(feature = "tokio")]
impl AsyncChannelSink {
    pub fn new(sender: tokio::sync::mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { sender }
    }
}

#[cfg(feature = "tokio")]
impl EventSink for AsyncChannelSink {
    fn on_event(&mut self, event: StreamEvent) {
        if self.sender.send(event).is_err() {
            debug!("event receiver dropped; discarding event");
        }
    }
}
