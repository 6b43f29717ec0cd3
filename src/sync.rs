//! The `sync` pipeline: fetch, compare with the cached copy, rotate on change.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    change::{self, ChangeVerdict, Witness},
    cli::SyncArgs,
    error::SyncError,
    fetch::{self, SchemaSource},
    rotate::{self, RotationOutcome, ScratchFile},
    settings::Settings,
    snapshot::{self, ReadOptions, Snapshot},
};

/// Everything one sync run knows about the old and new schema.
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Cached snapshot, `None` when no cache file exists yet.
    pub old: Option<Snapshot>,
    pub new: Snapshot,
    /// Downloaded bytes, written verbatim to the cache on rotation.
    pub raw: Vec<u8>,
}

impl SyncContext {
    pub fn load(
        source: &dyn SchemaSource,
        cache: &Path,
        scratch: &ScratchFile,
        options: ReadOptions,
    ) -> Result<Self, SyncError> {
        let old = snapshot::load_snapshot(cache, options).map_err(|err| {
            SyncError::CacheUnreadable {
                path: cache.to_path_buf(),
                reason: format!("{err:#}"),
            }
        })?;

        let label = source.label();
        let unavailable = |reason: String| SyncError::FetchUnavailable {
            source_label: label.clone(),
            reason,
        };
        let raw = source.fetch().map_err(|err| unavailable(format!("{err:#}")))?;
        scratch
            .write(&raw)
            .map_err(|err| unavailable(format!("writing {:?}: {err}", scratch.path())))?;
        let new = snapshot::load_snapshot(scratch.path(), options)
            .map_err(|err| unavailable(format!("{err:#}")))?
            .unwrap_or_default();
        if new.is_empty() {
            return Err(unavailable("content is not a usable schema snapshot".to_string()));
        }
        debug!(
            "Loaded {} cached row(s) and {} new row(s)",
            old.as_ref().map_or(0, Snapshot::len),
            new.len()
        );
        Ok(Self { old, new, raw })
    }

    pub fn verdict(&self, options: ReadOptions) -> ChangeVerdict {
        change::detect(self.old.as_ref(), &self.new, options.mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Unchanged,
    /// Changed upstream; `rotation` is `None` for dry runs.
    Changed {
        witness: Witness,
        rotation: Option<RotationOutcome>,
    },
}

pub fn synchronize(
    source: &dyn SchemaSource,
    cache: &Path,
    scratch: &Path,
    options: ReadOptions,
    dry_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let scratch = ScratchFile::claim(scratch);
    let context = SyncContext::load(source, cache, &scratch, options)?;
    let witness = match context.verdict(options) {
        ChangeVerdict::Unchanged => {
            info!("No content changes detected");
            return Ok(SyncOutcome::Unchanged);
        }
        ChangeVerdict::Changed(witness) => witness,
    };
    if dry_run {
        info!("Content changes detected ({witness}); dry run, leaving {cache:?} untouched");
        return Ok(SyncOutcome::Changed {
            witness,
            rotation: None,
        });
    }
    info!("Content changes detected ({witness}), saving new schema...");
    let rotation = rotate::rotate(cache, &context.raw, context.old.as_ref())?;
    Ok(SyncOutcome::Changed {
        witness,
        rotation: Some(rotation),
    })
}

pub fn execute(args: &SyncArgs, settings: &Settings) -> Result<()> {
    let url = settings.url(args.url.as_deref());
    let cache = settings.cache(args.cache.as_deref());
    let scratch = settings.scratch(args.scratch.as_deref());
    let options = ReadOptions {
        mode: settings.compat(args.compat),
        ..ReadOptions::default()
    };
    info!("Checking {url} against {cache:?}");
    let source = fetch::source_for(&url);
    let outcome = synchronize(source.as_ref(), &cache, &scratch, options, args.dry_run)
        .with_context(|| format!("Synchronizing {cache:?} from {url}"))?;
    if let SyncOutcome::Changed {
        rotation: Some(rotation),
        ..
    } = &outcome
    {
        match &rotation.archived {
            Some(archive) => info!("Previous schema kept at {archive:?}"),
            None => info!("Installed first copy of the schema at {:?}", rotation.cache),
        }
    }
    Ok(())
}
