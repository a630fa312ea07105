mod cli;
mod collab;
mod commands;
mod config;
mod logging;
mod model;
mod nav;
mod ops;
mod resolve;
mod state;
mod storage;
mod ui;
mod view_model;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::load()?;
    match config.log_dir() {
        Ok(dir) => {
            if let Err(err) = logging::init_logging(config.log_level.as_deref(), &dir) {
                eprintln!("warning: logging disabled: {}", err);
            }
        }
        Err(err) => eprintln!("warning: logging disabled: {:#}", err),
    }

    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Show { target } => commands::show(&config, target),
        cli::Command::Add {
            text,
            priority,
            target,
        } => commands::add(&config, text, priority, target),
        cli::Command::Toggle { index, target } => commands::toggle(&config, index, target),
        cli::Command::Rm { index, target } => commands::remove(&config, index, target),
        cli::Command::Section { title } => commands::section(&config, title),
        cli::Command::Page { section, title } => commands::page(&config, section, title),
        cli::Command::DeletePage { section, page, yes } => {
            commands::delete_page(&config, section, page, yes)
        }
        cli::Command::DeleteDay { date, yes } => commands::delete_day(&config, date, yes),
        cli::Command::Finish => commands::finish(&config),
        cli::Command::History => commands::history(&config),
        cli::Command::Tui => commands::tui(&config),
    }
}
