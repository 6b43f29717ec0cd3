use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::CompileArgs,
    io_utils,
    settings::Settings,
    snapshot::{self, ReadOptions, Snapshot},
    sql::{self, TableTarget},
};

pub fn execute(args: &CompileArgs, settings: &Settings) -> Result<()> {
    let input = settings.cache(args.input.as_deref());
    let output = settings.output(args.output.as_deref());
    let options = ReadOptions {
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        mode: settings.compat(args.compat),
    };
    let target = TableTarget::new(
        settings.schema(args.schema.as_deref()),
        settings.table(args.table.as_deref()),
        settings.owner(args.owner.as_deref()),
    );

    let snapshot = snapshot::load_snapshot(&input, options)
        .with_context(|| format!("Reading schema CSV {input:?}"))?
        .unwrap_or_else(|| {
            warn!("Schema CSV {input:?} does not exist; compiling an empty table definition");
            Snapshot::empty()
        });
    if snapshot.is_empty() {
        warn!("No rows to insert; emitting table definition only");
    }

    let compiled = sql::compile(&snapshot, &target, options.mode);
    io_utils::write_text(&output, &compiled.render())
        .with_context(|| format!("Saving SQL to {output:?}"))?;
    info!(
        "Compiled {} row(s) into \"{}\".\"{}\" written to {:?}",
        snapshot.len(),
        target.schema,
        target.table,
        output
    );
    Ok(())
}
