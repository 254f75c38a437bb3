#![warn(missing_docs)]
//! Deterministic testing surfaces: frame harness, golden snapshots, JSONL frame logs.

mod frames;
mod metrics;
mod snapshot;

use anyhow::Result;
use rainscape_core::SimTick;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use frames::*;
pub use metrics::*;
pub use snapshot::*;

/// One line of a headless frame log.
#[derive(Debug, Serialize)]
pub struct FrameRecord<'a, T: Serialize> {
    /// Frame counter.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Record payload.
    pub data: &'a T,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
    lines: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Append a record to the log.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_sink_writes_one_line_per_record() {
        let path = std::env::temp_dir().join(format!(
            "rainscape-frames-{}-{}.jsonl",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let mut sink = JsonlSink::create(&path).expect("sink create");
        for tick in 0..3 {
            let active = tick * 50;
            sink.write(&FrameRecord {
                tick: SimTick(tick),
                kind: "frame",
                data: &active,
            })
            .expect("write succeeds");
        }
        sink.flush().expect("flush");
        assert_eq!(sink.lines(), 3);
        let contents = fs::read_to_string(&path).expect("file readable");
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("\"kind\":\"frame\""));
        let _ = fs::remove_file(&path);
    }
}
