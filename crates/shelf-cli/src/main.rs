//! Shelfstar CLI - turns a retail listing feed into a validated star schema

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::Cli;
use commands::{common, run, test, validate};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
        cli::Commands::Test(args) => test::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if err.downcast_ref::<common::ExitCode>().is_none() {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(common::exit_code(&err));
    }
}
