//! CLI entry point for the few-step extraction attack

use clap::Parser;
use verbatim::io::cli::Cli;
use verbatim::io::logging::init_logging;

fn main() -> verbatim::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_filter());
    cli.run()
}
