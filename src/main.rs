use clap::Parser;

mod cmd;

use cmd::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show(a) => a.run(),
        Commands::CheckEquivalence(a) => a.run(),
        Commands::Miter(a) => a.run(),
    }
}
