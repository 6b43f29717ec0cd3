use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Unable to load new content from {source_label}: {reason}")]
    FetchUnavailable { source_label: String, reason: String },

    #[error("Unable to read cached schema {path:?}: {reason}")]
    CacheUnreadable { path: PathBuf, reason: String },

    #[error("Failed to archive previous schema to {path:?}")]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archived previous schema to {archive:?} but failed to replace {cache:?}")]
    PartialRotation {
        archive: PathBuf,
        cache: PathBuf,
        #[source]
        source: io::Error,
    },
}
