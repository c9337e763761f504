//! Log record envelope for bus publishers
//!
//! Publishers embed their own fields and stamp the record just before
//! sending. The forwarder itself never constructs these: inbound payloads
//! stay untyped JSON end to end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope for log records published onto the bus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unix-millis send time, set by [`LogRecord::mark_timestamp`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    /// Application-defined fields, serialized at the top level
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an application field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Mark `timestamp` as current time.
    pub fn mark_timestamp(&mut self) {
        self.timestamp = Some(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_millis() as u64,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_serialize_at_the_top_level() {
        let record = LogRecord::new()
            .with("app", "sample-logger")
            .with("severity", "Log")
            .with("message", "log message for test");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["app"], "sample-logger");
        assert_eq!(value["severity"], "Log");
        assert_eq!(value["message"], "log message for test");
        // unset timestamp is omitted, not null
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn mark_timestamp_sets_current_time() {
        let mut record = LogRecord::new().with("app", "sample-logger");
        record.mark_timestamp();

        let ts = record.timestamp.expect("timestamp should be set");
        assert!(ts > 1_500_000_000_000, "timestamp should be unix millis");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], ts);
    }

    #[test]
    fn round_trips_through_json() {
        let mut record = LogRecord::new().with("message", "hello");
        record.mark_timestamp();

        let bytes = serde_json::to_vec(&record).unwrap();
        let decoded: LogRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded.timestamp, record.timestamp);
        assert_eq!(decoded.fields["message"], "hello");
    }
}
