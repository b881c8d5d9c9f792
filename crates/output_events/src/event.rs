use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// Tag carried by events built from plain text with no decoded payload.
pub const VERBOSE_EVENT: &str = "verbose";
/// Tag carried by the terminal sentinel.
pub const EOF_EVENT: &str = "EOF";

/// Opaque key/value payload recovered from a marker.
pub type DecodedRecord = Map<String, Value>;

/// One emitted event: the decoded payload (if any) overlaid with `counter`,
/// `stdout`, `start_line` and `end_line`.
///
/// Field order follows insertion order, so payload keys keep their position
/// and the bookkeeping fields land where the payload first declared them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: Map<String, Value>,
}

impl EventRecord {
    pub(crate) fn verbose(counter: u64, stdout: String, start_line: u64, end_line: u64) -> Self {
        let mut fields = Map::new();
        fields.insert("event".to_string(), Value::from(VERBOSE_EVENT));
        Self::overlay(fields, counter, stdout, start_line, end_line)
    }

    pub(crate) fn correlated(
        payload: DecodedRecord,
        counter: u64,
        stdout: String,
        start_line: u64,
        end_line: u64,
    ) -> Self {
        Self::overlay(payload, counter, stdout, start_line, end_line)
    }

    fn overlay(
        mut fields: Map<String, Value>,
        counter: u64,
        stdout: String,
        start_line: u64,
        end_line: u64,
    ) -> Self {
        fields.insert("counter".to_string(), Value::from(counter));
        fields.insert("stdout".to_string(), Value::from(stdout));
        fields.insert("start_line".to_string(), Value::from(start_line));
        fields.insert("end_line".to_string(), Value::from(end_line));
        Self { fields }
    }

    /// The `event` tag, when the payload carried a string one.
    pub fn event(&self) -> Option<&str> {
        self.fields.get("event").and_then(Value::as_str)
    }

    pub fn counter(&self) -> u64 {
        self.u64_field("counter")
    }

    pub fn stdout(&self) -> &str {
        self.fields
            .get("stdout")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn start_line(&self) -> u64 {
        self.u64_field("start_line")
    }

    pub fn end_line(&self) -> u64 {
        self.u64_field("end_line")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    fn u64_field(&self, key: &str) -> u64 {
        self.fields.get(key).and_then(Value::as_u64).unwrap_or(0)
    }
}

/// Terminal sentinel: `{"event": "EOF", "final_counter": N}`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EofEvent {
    pub final_counter: u64,
}

impl Serialize for EofEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("event", EOF_EVENT)?;
        map.serialize_entry("final_counter", &self.final_counter)?;
        map.end()
    }
}

/// What a sink receives: every record in counter order, then one sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Record(EventRecord),
    Eof(EofEvent),
}

impl StreamEvent {
    pub fn as_record(&self) -> Option<&EventRecord> {
        match self {
            StreamEvent::Record(record) => Some(record),
            StreamEvent::Eof(_) => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, StreamEvent::Eof(_))
    }

    /// Flat JSON mapping, the shape downstream consumers persist.
    pub fn to_value(&self) -> Value {
        match self {
            StreamEvent::Record(record) => Value::Object(record.fields.clone()),
            StreamEvent::Eof(eof) => {
                let mut map = Map::new();
                map.insert("event".to_string(), Value::from(EOF_EVENT));
                map.insert("final_counter".to_string(), Value::from(eof.final_counter));
                Value::Object(map)
            }
        }
    }
}
