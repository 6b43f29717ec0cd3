//! Rotation of the cached schema file.
//!
//! The previous file is copied to a version-qualified sibling before the new
//! content replaces it. Both writes go through [`io_utils::replace_file`], so
//! each destination is either fully written or untouched.

use std::{
    borrow::Cow,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{error::SyncError, io_utils, snapshot::Snapshot};

pub const UNVERSIONED: &str = "unversioned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Where the previous content was archived, if there was any.
    pub archived: Option<PathBuf>,
    pub cache: PathBuf,
}

/// `ecs.csv` + `8.0.0` -> `ecs.8.0.0.csv`. Paths without an extension get the
/// token appended.
///
/// The version comes from downloaded content, so path separators and control
/// characters in it are replaced with `_` and the archive always stays a
/// sibling of the cache file.
pub fn archive_path(cache: &Path, version: &str) -> PathBuf {
    let token = archive_token(version);
    let stem = cache.file_stem().unwrap_or_default();
    let mut name = OsString::from(stem);
    name.push(".");
    name.push(token.as_ref());
    if let Some(ext) = cache.extension() {
        name.push(".");
        name.push(ext);
    }
    cache.with_file_name(name)
}

fn archive_token(version: &str) -> Cow<'_, str> {
    if !version.contains(|ch: char| matches!(ch, '/' | '\\') || ch.is_control()) {
        return Cow::Borrowed(version);
    }
    let cleaned = version
        .chars()
        .map(|ch| {
            if matches!(ch, '/' | '\\') || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect::<String>();
    warn!("Version '{}' is not a plain file name token; archiving as '{cleaned}'", version.escape_debug());
    Cow::Owned(cleaned)
}

pub fn rotate(
    cache: &Path,
    new_content: &[u8],
    old: Option<&Snapshot>,
) -> Result<RotationOutcome, SyncError> {
    let archived = match fs::read(cache) {
        Ok(previous) => {
            let version = old.and_then(Snapshot::version).unwrap_or_else(|| {
                warn!("Previous schema at {cache:?} has no version; archiving as '{UNVERSIONED}'");
                UNVERSIONED
            });
            let archive = archive_path(cache, version);
            info!(
                "Moving old schema ({version}) to {}",
                archive.file_name().unwrap_or_default().to_string_lossy()
            );
            io_utils::replace_file(&archive, &previous).map_err(|source| SyncError::Archive {
                path: archive.clone(),
                source,
            })?;
            Some(archive)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No previous schema at {cache:?}; nothing to archive");
            None
        }
        Err(source) => {
            return Err(SyncError::Archive {
                path: cache.to_path_buf(),
                source,
            });
        }
    };

    if let Err(source) = io_utils::replace_file(cache, new_content) {
        return Err(match archived {
            Some(archive) => SyncError::PartialRotation {
                archive,
                cache: cache.to_path_buf(),
                source,
            },
            None => SyncError::Archive {
                path: cache.to_path_buf(),
                source,
            },
        });
    }
    info!("Finished updating content");
    Ok(RotationOutcome {
        archived,
        cache: cache.to_path_buf(),
    })
}

/// Scratch download file that is removed when the guard is dropped, on every
/// exit path.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Takes ownership of `path`, clearing any leftover from an earlier run.
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Err(err) = io_utils::remove_if_exists(&path) {
            warn!("Could not remove stale tempfile {path:?}: {err}");
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, contents: &[u8]) -> std::io::Result<()> {
        io_utils::replace_file(&self.path, contents)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match io_utils::remove_if_exists(&self.path) {
            Ok(true) => info!("Removing tempfile: {}", self.path.display()),
            Ok(false) => {}
            Err(err) => warn!("Could not remove tempfile {:?}: {err}", self.path),
        }
        debug!("Cleanup complete");
    }
}
