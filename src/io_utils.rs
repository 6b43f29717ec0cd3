//! I/O utilities for CSV reading, decoding, and file replacement.
//!
//! All file I/O in ecs-schema-sync flows through this module. It provides:
//!
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: `open_csv_reader` over any byte source. Readers are
//!   flexible so a short row never aborts a snapshot read.
//! - **stdout**: the `-` path convention routes SQL output to standard out.
//! - **Replacement**: `replace_file` writes to a sibling temp file and renames it
//!   over the destination, so readers never observe a half-written file.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Builds a headerless reader; callers treat the first record as the header.
pub fn open_csv_reader<R>(reader: R) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b',')
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Writes `text` to `path`, or to stdout when the path is `-`.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if is_dash(path) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(text.as_bytes())?;
        return handle.flush().context("Flushing stdout");
    }
    replace_file(path, text.as_bytes()).with_context(|| format!("Writing output file {path:?}"))
}

/// Replaces `path` with `contents` via a sibling temp file and a rename.
///
/// The temp file handle is scoped to this call and is closed before the rename.
/// A failed write removes the temp file and leaves `path` untouched.
pub fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let staging = staging_path(path);
    let written = write_staging(&staging, contents);
    if let Err(err) = written {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    debug!("Renaming {staging:?} over {path:?}");
    fs::rename(&staging, path).inspect_err(|_| {
        let _ = fs::remove_file(&staging);
    })
}

fn write_staging(staging: &Path, contents: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(staging)?);
    writer.write_all(contents)?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

/// Removes `path` if present. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replace_file_overwrites_and_leaves_no_staging_file() {
        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("ecs.csv");
        fs::write(&target, "old").expect("seed");
        replace_file(&target, b"new").expect("replace");
        assert_eq!(fs::read_to_string(&target).expect("read"), "new");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn replace_file_creates_missing_parent_directories() {
        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("data").join("Elastic").join("ecs.csv");
        replace_file(&target, b"content").expect("replace");
        assert_eq!(fs::read(&target).expect("read"), b"content");
    }

    #[test]
    fn remove_if_exists_is_idempotent() {
        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("scratch.csv");
        fs::write(&target, "x").expect("seed");
        assert!(remove_if_exists(&target).expect("first remove"));
        assert!(!remove_if_exists(&target).expect("second remove"));
    }

    #[test]
    fn resolve_encoding_rejects_unknown_labels() {
        let err = resolve_encoding(Some("not-an-encoding")).unwrap_err();
        assert!(err.to_string().contains("Unknown encoding"));
        assert_eq!(resolve_encoding(Some(" latin1 ")).expect("latin1").name(), "windows-1252");
    }
}
