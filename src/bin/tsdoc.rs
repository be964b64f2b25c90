use clap::Parser;

use tsdoc::cli::args::CliArgs;
use tsdoc::cli::driver;

fn main() -> anyhow::Result<()> {
    tsdoc_common::trace::init();
    let args = CliArgs::parse();
    driver::run(args)
}
