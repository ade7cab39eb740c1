use crate::{
    codec::{CodecOptions, PackedCodec, PlainTextCodec},
    info,
    storage::{archive, packed},
    success,
    types::Database,
    warn,
};

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

pub fn verify(path: &Path, options: CodecOptions) -> Result<()> {
    let raw = fs::read(path).context(format!("Failed to read {}", path.display()))?;
    let text = PlainTextCodec::new(options);
    let db = archive::load_from(&text, raw.as_slice())?;
    info!("Loaded {} packages from {}", db.len(), path.display());

    if options == CodecOptions::default() {
        // With nothing skipped, a well formed sync database is reproduced as is
        if archive::desc_payload(raw.as_slice())? != archive::dump_payload(&text, &db)? {
            warn!(
                "{} is not canonically formatted, comparing against its re-generated form",
                path.display()
            );
        }
    }

    round_trip(&db, options)?;
    success!("Conversion text -> packed -> text reproduces the database exactly");
    Ok(())
}

/// Fail unless `db` dumps to the same text after a trip through the packed format
fn round_trip(db: &Database, options: CodecOptions) -> Result<()> {
    let text = PlainTextCodec::new(options);
    let codec = PackedCodec::new(options);

    let expected = archive::dump_payload(&text, db)?;
    let mut buf = Vec::new();
    packed::store_into(&codec, &mut buf, db)?;
    info!("Packed form is {} bytes", buf.len());
    let reloaded = packed::load_from(&codec, &mut buf.as_slice())?;
    let actual = archive::dump_payload(&text, &reloaded)?;

    if actual != expected {
        let first = expected
            .iter()
            .zip(actual.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| expected.len().min(actual.len()));
        bail!("Conversion text -> packed -> text differs from the original at byte {first}");
    }
    Ok(())
}
