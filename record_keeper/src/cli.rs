//! Command-line interface definitions using clap derive API.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Record keeper CLI
#[derive(Parser)]
#[command(name = "keeper")]
#[command(about = "Contact book and task tracker over JSON files")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive task session
    Tasks,
    /// Manage contacts
    Contacts {
        #[command(subcommand)]
        action: ContactAction,
    },
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Add a contact
    Add(ContactFields),
    /// List every contact
    List,
    /// Search by name (case-insensitive) or phone number
    Search {
        term: String,
    },
    /// Replace the first contact with the given name
    Update {
        /// Current name of the contact
        #[arg(long)]
        old_name: String,
        #[command(flatten)]
        fields: ContactFields,
    },
    /// Delete every contact with the given name
    Delete {
        name: String,
    },
    /// Delete a single contact by id
    RemoveId {
        id: String,
    },
}

#[derive(Args)]
pub struct ContactFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
}
