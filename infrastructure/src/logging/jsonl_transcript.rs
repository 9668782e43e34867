//! JSONL file writer for debate transcript events.
//!
//! Each [`TranscriptEvent`] becomes one JSON line carrying its `type`, an
//! RFC 3339 `timestamp` and a per-file `seq` number, appended through a
//! buffered writer.

use debate_application::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

/// Transcript logger that appends one JSON object per line.
///
/// Thread-safe via a mutex around the writer. Flushes after every event and
/// on `Drop`.
pub struct JsonlTranscriptLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: TranscriptEvent, seq: u64) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = Map::new();
        record.insert("type".to_string(), Value::String(event.event_type.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));
        record.insert("seq".to_string(), Value::from(seq));

        match event.payload {
            Value::Object(fields) => {
                for (key, value) in fields {
                    record.entry(key).or_insert(value);
                }
            }
            Value::Null => {}
            other => {
                record.insert("data".to_string(), other);
            }
        }

        Value::Object(record)
    }
}

impl TranscriptLogger for JsonlTranscriptLogger {
    fn log(&self, event: TranscriptEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };

        sink.seq += 1;
        let record = Self::record(event, sink.seq);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Err(e) = writeln!(sink.writer, "{}", line).and_then(|_| sink.writer.flush()) {
            warn!("Could not write transcript {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();

        logger.log(TranscriptEvent::new(
            "round_started",
            serde_json::json!({"debate_id": "aapl-1", "round": 1}),
        ));
        logger.log(TranscriptEvent::new(
            "round_evaluated",
            serde_json::json!({"debate_id": "aapl-1", "record": {"consensus": true}}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "round_started");
        assert_eq!(lines[0]["round"], 1);
        assert_eq!(lines[0]["seq"], 1);
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["record"]["consensus"], true);
        assert_eq!(lines[1]["seq"], 2);
    }

    #[test]
    fn test_payload_cannot_override_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();

        logger.log(TranscriptEvent::new(
            "debate_finalized",
            serde_json::json!({"type": "spoofed", "output": "HOLD"}),
        ));
        logger.log(TranscriptEvent::new("note", serde_json::json!("plain text")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "debate_finalized");
        assert_eq!(lines[0]["output"], "HOLD");
        assert_eq!(lines[1]["data"], "plain text");
    }

    #[test]
    fn test_appends_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/debate.jsonl");

        let first = JsonlTranscriptLogger::open(&path).unwrap();
        first.log(TranscriptEvent::new("debate_started", serde_json::json!({})));
        drop(first);

        let second = JsonlTranscriptLogger::open(&path).unwrap();
        second.log(TranscriptEvent::new("debate_started", serde_json::json!({})));
        drop(second);

        assert_eq!(read_lines(&path).len(), 2);
    }
}
