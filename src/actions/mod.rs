mod bench;
mod convert;
mod verify;

use crate::{
    codec::CodecOptions,
    config::{Opts, SubCmd},
};

use anyhow::Result;

pub fn fullfill_command(opts: &Opts, options: CodecOptions) -> Result<()> {
    match &opts.subcmd {
        SubCmd::Convert(args) => convert::convert(args, options),
        SubCmd::Verify(args) => verify::verify(&args.db, options),
        SubCmd::Bench(args) => bench::bench(&args.db),
    }
}
