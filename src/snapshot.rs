//! Parsing of the ECS field CSV into a normalized [`Snapshot`].
//!
//! A snapshot is read fresh from bytes every time and only lives for one
//! compile or compare cycle. Shape problems (header only, wrong arity) are
//! not errors: they log a warning and yield an empty snapshot, which callers
//! treat as "nothing usable". Only I/O and decoding failures are errors.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};

use crate::{cli::CompatMode, io_utils};

pub const COLUMN_COUNT: usize = 9;

/// Canonical column names in file and INSERT order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "ECS_Version",
    "Indexed",
    "Field_Set",
    "Field",
    "Type",
    "Level",
    "Normalization",
    "Example",
    "Description",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRow {
    pub ecs_version: String,
    pub indexed: bool,
    pub field_set: String,
    pub field: String,
    pub field_type: String,
    pub level: String,
    pub normalization: Option<String>,
    pub example: Option<String>,
    pub description: String,
}

impl SchemaRow {
    /// Value of one of the text columns by canonical name.
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            "ECS_Version" => Some(&self.ecs_version),
            "Field_Set" => Some(&self.field_set),
            "Field" => Some(&self.field),
            "Type" => Some(&self.field_type),
            "Level" => Some(&self.level),
            "Normalization" => self.normalization.as_deref(),
            "Example" => self.example.as_deref(),
            "Description" => Some(&self.description),
            _ => None,
        }
    }

    /// Stable textual form used for row hashing. Every field is tagged with its
    /// column name and absent values render distinctly from empty strings.
    pub fn canonical(&self) -> String {
        fn opt(value: &Option<String>) -> String {
            match value {
                Some(v) => format!("{v:?}"),
                None => "None".to_string(),
            }
        }
        format!(
            "{{ECS_Version: {:?}, Indexed: {}, Field_Set: {:?}, Field: {:?}, Type: {:?}, Level: {:?}, Normalization: {}, Example: {}, Description: {:?}}}",
            self.ecs_version,
            self.indexed,
            self.field_set,
            self.field,
            self.field_type,
            self.level,
            opt(&self.normalization),
            opt(&self.example),
            self.description,
        )
    }

    /// Cells in canonical column order, with absent values left blank.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.ecs_version.clone(),
            self.indexed.to_string(),
            self.field_set.clone(),
            self.field.clone(),
            self.field_type.clone(),
            self.level.clone(),
            self.normalization.clone().unwrap_or_default(),
            self.example.clone().unwrap_or_default(),
            self.description.clone(),
        ]
    }

    fn from_cells(cells: &[String], mode: CompatMode) -> Self {
        let cell = |idx: usize| cells.get(idx).cloned().unwrap_or_default();
        let optional = |idx: usize| Some(cell(idx)).filter(|value| !value.is_empty());
        SchemaRow {
            ecs_version: cell(0),
            indexed: coerce_indexed(&cell(1), mode),
            field_set: cell(2),
            field: cell(3),
            field_type: cell(4),
            level: cell(5),
            normalization: optional(6),
            example: optional(7),
            description: cell(8),
        }
    }
}

/// Converts the raw `Indexed` text to a boolean.
///
/// `Legacy` keeps the historical truthiness rule where any non-empty text,
/// including `"False"`, is `true`. `Strict` recognises the usual false tokens.
pub fn coerce_indexed(raw: &str, mode: CompatMode) -> bool {
    match mode {
        CompatMode::Legacy => !raw.is_empty(),
        CompatMode::Strict => !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "f" | "no" | "n" | "0"
        ),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub headers: Vec<String>,
    pub rows: Vec<SchemaRow>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `ECS_Version` of the trailing row, which names the snapshot.
    pub fn version(&self) -> Option<&str> {
        self.rows.last().map(|row| row.ecs_version.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub encoding: &'static Encoding,
    pub mode: CompatMode,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            mode: CompatMode::default(),
        }
    }
}

/// Reads a snapshot from any byte source. `label` names the source in diagnostics.
pub fn read_snapshot<R: Read>(source: R, label: &str, options: ReadOptions) -> Result<Snapshot> {
    let mut reader = io_utils::open_csv_reader(source);
    let mut records = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading line {} of {label}", idx + 1))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding line {} of {label}", idx + 1))?;
        records.push(decoded);
    }

    if records.len() < 2 {
        warn!("No data found in {label}, Line Count: {}", records.len());
        return Ok(Snapshot::empty());
    }
    let headers = records.remove(0);
    if headers.len() != COLUMN_COUNT {
        warn!(
            "Wrong header length in {label}, Column Count: {}, expected {COLUMN_COUNT}",
            headers.len()
        );
        return Ok(Snapshot::empty());
    }
    for (expected, found) in COLUMNS.iter().zip(&headers) {
        if expected != found {
            debug!("Header '{found}' in {label} read as '{expected}'");
        }
    }

    let rows = records
        .iter()
        .map(|cells| SchemaRow::from_cells(cells, options.mode))
        .collect::<Vec<_>>();
    debug!("Read {} row(s) from {label}", rows.len());
    Ok(Snapshot { headers, rows })
}

pub fn read_snapshot_bytes(bytes: &[u8], label: &str, options: ReadOptions) -> Result<Snapshot> {
    read_snapshot(bytes, label, options)
}

/// Reads a snapshot from disk. A missing file yields `None`.
pub fn load_snapshot(path: &Path, options: ReadOptions) -> Result<Option<Snapshot>> {
    if !path.exists() {
        debug!("No snapshot at {path:?}");
        return Ok(None);
    }
    let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
    let label = path.display().to_string();
    read_snapshot(BufReader::new(file), &label, options).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "ECS_Version,Indexed,Field_Set,Field,Type,Level,Normalization,Example,Description\n";

    fn read(text: &str, mode: CompatMode) -> Snapshot {
        let options = ReadOptions {
            mode,
            ..ReadOptions::default()
        };
        read_snapshot_bytes(text.as_bytes(), "test", options).expect("read")
    }

    #[test]
    fn header_only_is_empty() {
        assert!(read(HEADER, CompatMode::Strict).is_empty());
        assert!(read("", CompatMode::Strict).is_empty());
    }

    #[test]
    fn wrong_arity_is_empty() {
        let text = "a,b,c\n1,2,3\n";
        assert!(read(text, CompatMode::Strict).is_empty());
    }

    #[test]
    fn empty_normalization_and_example_become_absent() {
        let text = format!("{HEADER}8.0.0,true,host,host.name,keyword,core,,,Hostname\n");
        let snapshot = read(&text, CompatMode::Strict);
        assert_eq!(snapshot.len(), 1);
        let row = &snapshot.rows[0];
        assert_eq!(row.normalization, None);
        assert_eq!(row.example, None);
        assert_eq!(row.description, "Hostname");
        assert!(row.indexed);
    }

    #[test]
    fn empty_description_is_kept_verbatim() {
        let text = format!("{HEADER}8.0.0,true,host,host.id,keyword,core,array,abc,\n");
        let row = &read(&text, CompatMode::Strict).rows[0];
        assert_eq!(row.description, "");
        assert_eq!(row.normalization.as_deref(), Some("array"));
        assert_eq!(row.example.as_deref(), Some("abc"));
    }

    #[test]
    fn legacy_mode_treats_false_text_as_true() {
        assert!(coerce_indexed("False", CompatMode::Legacy));
        assert!(!coerce_indexed("", CompatMode::Legacy));
        assert!(!coerce_indexed("False", CompatMode::Strict));
        assert!(!coerce_indexed(" no ", CompatMode::Strict));
        assert!(coerce_indexed("true", CompatMode::Strict));
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let text = format!("{HEADER}8.0.0,true,host,host.name,keyword,core\n");
        let row = &read(&text, CompatMode::Strict).rows[0];
        assert_eq!(row.level, "core");
        assert_eq!(row.normalization, None);
        assert_eq!(row.description, "");
    }

    #[test]
    fn canonical_distinguishes_absent_from_empty() {
        let text = format!(
            "{HEADER}8.0.0,true,host,host.name,keyword,core,,,Hostname\n8.0.0,true,host,host.name,keyword,core,,\"\",Hostname\n"
        );
        let snapshot = read(&text, CompatMode::Strict);
        assert_eq!(snapshot.rows[0].canonical(), snapshot.rows[1].canonical());
        let mut tweaked = snapshot.rows[0].clone();
        tweaked.example = Some(String::new());
        assert_ne!(tweaked.canonical(), snapshot.rows[0].canonical());
    }

    #[test]
    fn version_comes_from_trailing_row() {
        let text = format!(
            "{HEADER}8.0.0,true,host,host.name,keyword,core,,,a\n8.1.0,true,host,host.id,keyword,core,,,b\n"
        );
        assert_eq!(read(&text, CompatMode::Strict).version(), Some("8.1.0"));
    }
}
