use crate::{codec::CodecOptions, storage::Format};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Defaults read from the configuration file
#[derive(Deserialize, Serialize, Default, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub codec: CodecOptions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&data)
            .context(format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[derive(Parser)]
#[clap(about, version)]
pub struct Opts {
    #[clap(long, help = "Read default codec options from this TOML file")]
    pub config: Option<PathBuf>,
    #[clap(long, global = true, help = "Leave out the MD5 checksum of every package")]
    pub skip_md5: bool,
    #[clap(long, global = true, help = "Leave out the PGP signature of every package")]
    pub skip_pgp: bool,
    #[clap(
        long,
        global = true,
        help = "Store integers of the packed format as variable length integers"
    )]
    pub var_int: bool,
    #[clap(short, long, global = true, help = "Print additional debug information")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub subcmd: SubCmd,
}

impl Opts {
    /// Options from the config file, with command line flags switched on top
    pub fn codec_options(&self, config: &Config) -> CodecOptions {
        CodecOptions {
            skip_md5: config.codec.skip_md5 || self.skip_md5,
            skip_pgp: config.codec.skip_pgp || self.skip_pgp,
            var_int: config.codec.var_int || self.var_int,
        }
    }
}

#[derive(Parser)]
pub enum SubCmd {
    /// Convert a package database between the text and packed formats
    Convert(ConvertDb),
    /// Check that converting a sync database to packed and back reproduces it
    Verify(VerifyDb),
    /// Compare database sizes across formats and options
    Bench(BenchDb),
}

#[derive(Parser)]
pub struct ConvertDb {
    /// Format of the input: text or packed
    #[clap(long)]
    pub from: Format,
    /// Format of the output: text or packed
    #[clap(long)]
    pub to: Format,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct VerifyDb {
    /// pacman sync database to check
    pub db: PathBuf,
}

#[derive(Parser)]
pub struct BenchDb {
    /// pacman sync database to use as sample
    pub db: PathBuf,
}
