//! CLI argument definitions using clap
//!
//! Commands:
//! - roadregistry add --id <id> --first-name <n> --last-name <n> --address <a> --birthdate <d>
//! - roadregistry update <original-id> [--id ..] [--first-name ..] ...
//! - roadregistry demerit --id <id> --date <d> --points <n>
//! - roadregistry list [--json]
//! - roadregistry show <id>
//!
//! Every command takes `--file` for the backing store, defaulting to
//! `data/persons.txt`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::store::DEFAULT_STORE_PATH;

/// roadregistry - flat-file person registry with demerit-point tracking
#[derive(Parser, Debug)]
#[command(name = "roadregistry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new person to the registry
    Add {
        /// Path to the backing store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        file: PathBuf,

        /// Person identifier (10 characters, see format rules)
        #[arg(long)]
        id: String,

        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Address as number|street|city|state|country
        #[arg(long)]
        address: String,

        /// Birth date as DD-MM-YYYY
        #[arg(long)]
        birthdate: String,
    },

    /// Update a person's identity fields; omitted flags keep the stored value
    Update {
        /// Path to the backing store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        file: PathBuf,

        /// Identifier of the person to update
        original_id: String,

        /// New person identifier
        #[arg(long)]
        id: Option<String>,

        /// New given name
        #[arg(long)]
        first_name: Option<String>,

        /// New family name
        #[arg(long)]
        last_name: Option<String>,

        /// New address as number|street|city|state|country
        #[arg(long)]
        address: Option<String>,

        /// New birth date as DD-MM-YYYY
        #[arg(long)]
        birthdate: Option<String>,
    },

    /// Record demerit points against a person
    Demerit {
        /// Path to the backing store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        file: PathBuf,

        /// Identifier of the person
        #[arg(long)]
        id: String,

        /// Offense date as DD-MM-YYYY
        #[arg(long)]
        date: String,

        /// Point value, 1 to 6
        #[arg(long)]
        points: u32,
    },

    /// List all persons in the registry
    List {
        /// Path to the backing store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        file: PathBuf,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Show one person by identifier
    Show {
        /// Path to the backing store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        file: PathBuf,

        /// Identifier of the person
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
