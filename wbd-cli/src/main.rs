//! WBD CLI - load water-borne disease observations, train the risk model and
//! generate outbreak risk predictions.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wbd-cli",
    version,
    about = "Water-borne disease outbreak risk toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wbd_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("wbd-cli {}", env!("CARGO_PKG_VERSION"));
    wbd_cmd::run(cli.command)
}
