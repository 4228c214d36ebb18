// src/bin/reeltree.rs
use clap::Parser;
use colored::Colorize;
use reeltree_core::cli::{self, Cli};
use reeltree_core::exit::ReelExit;

fn main() -> ReelExit {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = if let Some(cmd) = cli.command {
        cli::dispatch::execute(cmd)
    } else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        Ok(ReelExit::Success)
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            ReelExit::for_error(&e)
        }
    }
}
