use super::Storage;
use crate::{
    codec::{Codec, CodecOptions, PackedCodec},
    debug,
    types::Database,
};

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct PackedStorage {
    path: PathBuf,
    codec: PackedCodec,
}

impl PackedStorage {
    pub fn new(path: &Path, options: CodecOptions) -> Self {
        PackedStorage {
            path: path.to_owned(),
            codec: PackedCodec::new(options),
        }
    }
}

impl Storage for PackedStorage {
    fn load(&self) -> Result<Database> {
        let f = File::open(&self.path)
            .context(format!("Failed to open {}", self.path.display()))?;
        let db = load_from(&self.codec, &mut BufReader::new(f))
            .context(format!("Failed to read packed database {}", self.path.display()))?;
        debug!("Read {} packages from {}", db.len(), self.path.display());
        Ok(db)
    }

    fn store(&self, db: &Database) -> Result<()> {
        let f = File::create(&self.path)
            .context(format!("Failed to create {}", self.path.display()))?;
        let mut w = BufWriter::new(f);
        store_into(&self.codec, &mut w, db)
            .context(format!("Failed to write packed database {}", self.path.display()))?;
        w.flush()?;
        Ok(())
    }
}

/// Parse records until the stream is exhausted
pub fn load_from<R: BufRead>(codec: &PackedCodec, r: &mut R) -> Result<Database> {
    let mut db = Database::new();
    while !r.fill_buf()?.is_empty() {
        let pkg = codec
            .parse(r)
            .with_context(|| format!("Bad record #{}", db.len()))?;
        db.packages.push(pkg);
    }
    Ok(db)
}

pub fn store_into<W: Write>(codec: &PackedCodec, w: &mut W, db: &Database) -> Result<()> {
    for (i, pkg) in db.iter().enumerate() {
        codec.dump(w, pkg).with_context(|| {
            format!(
                "Failed to write record #{i} ({})",
                pkg.name.as_deref().unwrap_or("unnamed")
            )
        })?;
    }
    Ok(())
}
