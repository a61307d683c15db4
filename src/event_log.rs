//! Fragmentation event log data model
//!
//! An [`EventLog`] is the pair of (events, metadata) read from a JSON document.
//! Events are opaque to the loader and sampler; only the metrics and dashboard
//! code look inside them.

use serde::Serialize;
use serde_json::{Map, Value};

/// A single fragmentation event (opaque JSON record)
pub type Event = Value;

/// Free-form metadata block attached to a log
pub type Metadata = Map<String, Value>;

/// Metadata key set to `true` once the log has been down-sampled
pub const SAMPLED_KEY: &str = "sampled";

/// Metadata key holding the pre-sampling event count
pub const ORIGINAL_COUNT_KEY: &str = "original_count";

/// Shape problems found while decoding a document
///
/// These are tolerated (the offending block is treated as empty) but are
/// reported so the operator knows the file was not what it claimed to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeWarning {
    /// Top-level document is not a JSON object
    NotAnObject,
    /// `events` exists but is not an array
    EventsNotArray,
    /// `metadata` exists but is not an object
    MetadataNotObject,
}

impl std::fmt::Display for ShapeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeWarning::NotAnObject => write!(f, "document is not a JSON object"),
            ShapeWarning::EventsNotArray => write!(f, "\"events\" is not an array"),
            ShapeWarning::MetadataNotObject => write!(f, "\"metadata\" is not an object"),
        }
    }
}

/// Events plus metadata for one input file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    /// Events in the order they appear in the source file
    pub events: Vec<Event>,
    /// Metadata block (empty when the document has none)
    pub metadata: Metadata,
}

impl EventLog {
    /// Create a log from parts
    pub fn new(events: Vec<Event>, metadata: Metadata) -> Self {
        Self { events, metadata }
    }

    /// Build a log from an already-decoded JSON document
    ///
    /// Missing keys become empty; keys of the wrong type also become empty and
    /// produce a [`ShapeWarning`].
    pub fn from_document(document: Value) -> (Self, Vec<ShapeWarning>) {
        let mut warnings = Vec::new();

        let mut root = match document {
            Value::Object(map) => map,
            _ => {
                warnings.push(ShapeWarning::NotAnObject);
                return (Self::default(), warnings);
            }
        };

        let events = match root.remove("events") {
            Some(Value::Array(events)) => events,
            Some(_) => {
                warnings.push(ShapeWarning::EventsNotArray);
                Vec::new()
            }
            None => Vec::new(),
        };

        let metadata = match root.remove("metadata") {
            Some(Value::Object(metadata)) => metadata,
            Some(_) => {
                warnings.push(ShapeWarning::MetadataNotObject);
                Map::new()
            }
            None => Map::new(),
        };

        (Self { events, metadata }, warnings)
    }

    /// Decode a log from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<(Self, Vec<ShapeWarning>)> {
        let document: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_document(document))
    }

    /// Number of events currently held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when there is nothing to visualize
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the sampler reduced this log
    pub fn is_sampled(&self) -> bool {
        self.metadata
            .get(SAMPLED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Event count before sampling, if the log was sampled
    pub fn original_count(&self) -> Option<u64> {
        self.metadata.get(ORIGINAL_COUNT_KEY).and_then(Value::as_u64)
    }
}
