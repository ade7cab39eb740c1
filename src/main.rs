mod actions;
mod cli;
mod codec;
mod config;
mod storage;
mod types;

use anyhow::Result;
use clap::Parser;
use config::{Config, Opts};
use lazy_static::lazy_static;

// Initialize writer
lazy_static! {
    static ref WRITER: cli::Writer = cli::Writer::new();
}

/// Exit codes:
/// 1 => something went wrong, see the printed error chain
fn main() {
    if let Err(err) = try_main() {
        error!("{}", err.to_string());
        err.chain().skip(1).for_each(|cause| {
            due_to!("{}", cause);
        });
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let opts = Opts::parse();
    cli::set_verbose(opts.verbose);

    let config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let options = opts.codec_options(&config);
    debug!("Codec options: {:?}", options);

    actions::fullfill_command(&opts, options)
}
