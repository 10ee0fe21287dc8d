//! Main entry point for the record keeper CLI.

use anyhow::Result;
use clap::Parser;
use record_keeper::{cli, commands, settings::Settings, telemetry};
use std::io;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = cli::Cli::parse();

    // Load settings
    let settings = Settings::load(args.config.as_deref())?;

    // Initialize logging
    telemetry::init(&settings.logging)?;

    // Execute the requested command
    match args.command {
        cli::Commands::Tasks => commands::run_tasks(&settings, io::stdin().lock(), io::stdout()),
        cli::Commands::Contacts { action } => {
            commands::run_contacts(action, &settings, &mut io::stdout())
        }
    }
}
