//! Conversion of a single [`Package`] from and to its serialized forms.
//!
//! Neither format is self-describing: the packed layout in particular only
//! reads back correctly with the very same [`CodecOptions`] it was written
//! with, and nothing in the bytes records which options those were.
mod error;
pub mod packed;
pub mod plaintext;
pub mod varint;

pub use error::{Error, Result};
pub use packed::PackedCodec;
pub use plaintext::PlainTextCodec;

use crate::types::Package;

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CodecOptions {
    /// Leave out the MD5 checksum entirely
    pub skip_md5: bool,
    /// Leave out the PGP signature entirely
    pub skip_pgp: bool,
    /// Store integers as varints instead of native endian u64 (packed format only)
    pub var_int: bool,
}

pub trait Codec {
    /// Read one record from `r`
    fn parse<R: BufRead>(&self, r: &mut R) -> Result<Package>;
    /// Write `pkg` as one record to `w`
    fn dump<W: Write>(&self, w: &mut W, pkg: &Package) -> Result<()>;
}
