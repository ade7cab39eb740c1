use crate::{codec::CodecOptions, config::ConvertDb, info, storage, success};

use anyhow::{bail, Result};
use console::style;

pub fn convert(args: &ConvertDb, options: CodecOptions) -> Result<()> {
    if args.input == args.output {
        bail!("Input and output must be different files");
    }

    let source = storage::open(args.from, &args.input, options);
    let target = storage::open(args.to, &args.output, options);

    info!(
        "Reading {} database {}...",
        args.from,
        style(args.input.display()).bold()
    );
    let db = source.load()?;
    info!("Writing {} packages as {}...", db.len(), args.to);
    target.store(&db)?;
    success!(
        "Converted {} packages to {}",
        db.len(),
        style(args.output.display()).bold()
    );

    Ok(())
}
