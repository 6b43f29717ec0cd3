#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ecs_schema_sync::snapshot::COLUMNS;
use tempfile::{TempDir, tempdir};

/// One CSV data row in canonical column order.
pub type RawRow = [&'static str; 9];

pub const HOST_NAME: RawRow = [
    "8.0.0", "true", "host", "host.name", "keyword", "core", "", "", "Hostname",
];

/// Rows of a small 7.0.0 schema.
pub fn v7_rows() -> Vec<RawRow> {
    vec![
        ["7.0.0", "true", "base", "@timestamp", "date", "core", "", "2016-05-23T08:05:34.853Z", "Date/time when the event originated."],
        ["7.0.0", "true", "host", "host.name", "keyword", "core", "", "", "Name of the host."],
        ["7.0.0", "true", "host", "host.ip", "ip", "core", "array", "", "Host ip addresses."],
    ]
}

/// The 7.0.0 rows bumped to 8.0.0 plus one extra field.
pub fn v8_rows() -> Vec<RawRow> {
    let mut rows = v7_rows();
    for row in &mut rows {
        row[0] = "8.0.0";
    }
    rows.push(["8.0.0", "false", "event", "event.kind", "keyword", "core", "", "alert", "The kind of event."]);
    rows
}

/// Serializes `rows` under the canonical header.
pub fn ecs_csv(rows: &[RawRow]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS).expect("write header");
    for row in rows {
        writer.write_record(row).expect("write row");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf-8 csv")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
