mod cli;

use std::process;

use clap::Parser;

use cli::upgrade::{cmd_upgrade, UpgradeArgs};
use elvish_upgrade::tracing_config::init_tracing;

#[derive(Parser)]
#[command(
    name = "elvish-upgrade",
    version,
    about = "Upgrade Elvish scripts from the pre-0.7 grammar to the 0.7 grammar"
)]
struct Cli {
    #[command(flatten)]
    args: UpgradeArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.args.verbose);
    process::exit(cmd_upgrade(cli.args));
}
