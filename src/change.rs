//! Change detection between a cached snapshot and a freshly fetched one.
//!
//! Three independent witnesses are evaluated in a fixed order and detection
//! stops at the first one that fires: row count, the set of `ECS_Version`
//! values, then per-row SHA-256 digests.

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use log::debug;
use sha2::{Digest, Sha256};

use crate::{cli::CompatMode, snapshot::Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Witness {
    /// The old snapshot is absent or the row counts differ.
    Count,
    /// The distinct `ECS_Version` values differ.
    Versions,
    /// A new row has no identical counterpart in the old snapshot.
    Rows,
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Witness::Count => "row count differs",
            Witness::Versions => "ECS versions differ",
            Witness::Rows => "row content differs",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeVerdict {
    Unchanged,
    Changed(Witness),
}

impl ChangeVerdict {
    pub fn is_changed(&self) -> bool {
        matches!(self, ChangeVerdict::Changed(_))
    }

    pub fn witness(&self) -> Option<Witness> {
        match self {
            ChangeVerdict::Changed(witness) => Some(*witness),
            ChangeVerdict::Unchanged => None,
        }
    }
}

pub fn detect(old: Option<&Snapshot>, new: &Snapshot, mode: CompatMode) -> ChangeVerdict {
    let Some(old) = old else {
        debug!("No cached snapshot; treating as changed");
        return ChangeVerdict::Changed(Witness::Count);
    };
    if count_changed(old, new) {
        return ChangeVerdict::Changed(Witness::Count);
    }
    if versions_changed(old, new, mode) {
        return ChangeVerdict::Changed(Witness::Versions);
    }
    if rows_changed(old, new) {
        return ChangeVerdict::Changed(Witness::Rows);
    }
    ChangeVerdict::Unchanged
}

pub fn has_changed(old: Option<&Snapshot>, new: &Snapshot, mode: CompatMode) -> bool {
    detect(old, new, mode).is_changed()
}

fn count_changed(old: &Snapshot, new: &Snapshot) -> bool {
    old.len() != new.len()
}

fn versions_changed(old: &Snapshot, new: &Snapshot, mode: CompatMode) -> bool {
    match mode {
        CompatMode::Strict => version_set(old) != version_set(new),
        CompatMode::Legacy => {
            let old_versions = versions_in_order(old);
            let new_versions = versions_in_order(new);
            old_versions.len() != new_versions.len()
                || old_versions
                    .iter()
                    .zip(&new_versions)
                    .any(|(left, right)| left != right)
        }
    }
}

fn version_set(snapshot: &Snapshot) -> BTreeSet<&str> {
    snapshot
        .rows
        .iter()
        .map(|row| row.ecs_version.as_str())
        .collect()
}

/// Distinct versions in order of first appearance.
fn versions_in_order(snapshot: &Snapshot) -> Vec<&str> {
    let mut seen = HashSet::new();
    snapshot
        .rows
        .iter()
        .map(|row| row.ecs_version.as_str())
        .filter(|version| seen.insert(*version))
        .collect()
}

fn rows_changed(old: &Snapshot, new: &Snapshot) -> bool {
    let known = old.rows.iter().map(|row| row_digest(&row.canonical())).collect::<HashSet<_>>();
    new.rows
        .iter()
        .any(|row| !known.contains(&row_digest(&row.canonical())))
}

fn row_digest(canonical: &str) -> [u8; 32] {
    Sha256::digest(canonical.as_bytes()).into()
}
