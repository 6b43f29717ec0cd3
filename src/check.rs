use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    change::{self, ChangeVerdict},
    cli::CheckArgs,
    settings::Settings,
    snapshot::{self, ReadOptions},
};

/// Offline counterpart of `sync --dry-run`: prints `changed (<witness>)` or
/// `unchanged` to stdout.
pub fn execute(args: &CheckArgs, settings: &Settings) -> Result<()> {
    let options = ReadOptions {
        mode: settings.compat(args.compat),
        ..ReadOptions::default()
    };
    let previous = snapshot::load_snapshot(&args.previous, options)
        .with_context(|| format!("Reading previous schema {:?}", args.previous))?;
    let current = snapshot::load_snapshot(&args.current, options)
        .with_context(|| format!("Reading current schema {:?}", args.current))?
        .unwrap_or_default();
    if current.is_empty() {
        bail!("{:?} is not a usable schema snapshot", args.current);
    }

    match change::detect(previous.as_ref(), &current, options.mode) {
        ChangeVerdict::Unchanged => println!("unchanged"),
        ChangeVerdict::Changed(witness) => println!("changed ({witness})"),
    }
    info!(
        "Compared {} previous row(s) with {} current row(s)",
        previous.as_ref().map_or(0, |s| s.len()),
        current.len()
    );
    Ok(())
}
