//! Whole databases on disk. These are the only places that know where a record
//! stream ends; a failure in any record aborts the entire load or store.
pub mod archive;
pub mod packed;

pub use archive::ArchiveStorage;
pub use packed::PackedStorage;

use crate::{codec::CodecOptions, types::Database};

use anyhow::Result;
use std::{fmt, path::Path, str::FromStr};

pub trait Storage {
    fn load(&self) -> Result<Database>;
    fn store(&self, db: &Database) -> Result<()>;
}

/// On-disk representation of a database
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// pacman sync database: a (possibly gzipped) tar of `desc` files
    Text,
    /// Packed records back to back
    Packed,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "plain" => Ok(Format::Text),
            "packed" => Ok(Format::Packed),
            _ => Err(format!("unknown format {s}, expected text or packed")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Text => f.write_str("text"),
            Format::Packed => f.write_str("packed"),
        }
    }
}

pub fn open(format: Format, path: &Path, options: CodecOptions) -> Box<dyn Storage> {
    match format {
        Format::Text => Box::new(ArchiveStorage::new(path, options)),
        Format::Packed => Box::new(PackedStorage::new(path, options)),
    }
}
