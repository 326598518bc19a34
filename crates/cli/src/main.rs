//! Clubhouse CLI - Database migrations and profile inspection.
//!
//! # Usage
//!
//! ```bash
//! # Run portal database migrations
//! clubhouse-cli migrate
//!
//! # Show how far a student's profile is from complete
//! clubhouse-cli profile status 6f1c2a4e-0d7b-4d3e-9a51-2f0e8c7b9d10
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `profile status` - Report a profile's render mode and missing fields

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use clubhouse_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "clubhouse-cli")]
#[command(author, version, about = "Clubhouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect student profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show completeness for the profile owned by a user
    Status {
        /// Sign-in identity of the profile owner
        user_id: UserId,
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
    match cli.command {
        Commands::Migrate => commands::migrate::portal().await?,
        Commands::Profile { action } => match action {
            ProfileAction::Status { user_id } => commands::profile::status(user_id).await?,
        },
    }
    Ok(())
}
