//! Customer Desk CLI - manage customers from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List customers
//! desk-cli list
//!
//! # Add a customer
//! desk-cli add --pan ABCDE1234F --email jane@x.com --mobile-number 9876543210 \
//!     --address-line1 "1 Rd" --postcode 560001
//!
//! # Check a PAN without saving anything
//! desk-cli verify-pan ABCDE1234F
//! ```
//!
//! # Commands
//!
//! - `list` / `show` - Read customers
//! - `add` / `edit` / `delete` - Change customers, with the same validation as the form
//! - `verify-pan` / `postcode` - Run a single lookup
//!
//! Configuration is read from the same environment variables as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::customers::CustomerFields;

#[derive(Parser)]
#[command(name = "desk-cli")]
#[command(author, version, about = "Customer Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all customers
    List,
    /// Show one customer as JSON
    Show {
        /// Position in the list
        index: usize,
    },
    /// Add a customer
    Add {
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Edit a customer; unset flags keep their current values
    Edit {
        /// Position in the list
        index: usize,

        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Delete a customer
    Delete {
        /// Position in the list
        index: usize,
    },
    /// Verify a PAN number
    VerifyPan {
        pan: String,
    },
    /// Resolve a postcode to its states and cities
    Postcode {
        postcode: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let state = commands::open_state()?;

    match cli.command {
        Commands::List => commands::customers::list(&state),
        Commands::Show { index } => commands::customers::show(&state, index)?,
        Commands::Add { fields } => {
            commands::customers::add(&state, fields).await?;
        }
        Commands::Edit { index, fields } => {
            commands::customers::edit(&state, index, fields).await?;
        }
        Commands::Delete { index } => commands::customers::delete(&state, index)?,
        Commands::VerifyPan { pan } => commands::lookup::verify_pan(&state, &pan).await?,
        Commands::Postcode { postcode } => commands::lookup::postcode(&state, &postcode).await?,
    }
    Ok(())
}
