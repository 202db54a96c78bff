use anyhow::Result;
use clap::Parser;
use tracing::error;
use vendorpull::cli;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        error!("{:#}", err);
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
