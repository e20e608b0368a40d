use clap::Parser;
use colored::Colorize;

mod app;
mod cli;
mod commands;
mod config;
mod deck;
mod diagram;
mod logging;
mod monitor;
mod page;
mod parser;
mod platform;
mod render;
mod router;
mod theme;
mod watcher;

fn main() {
    let cli = cli::Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    logging::init(cli.verbose, cli.quiet);

    if let Err(error) = cli.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
