//! Folio CLI - Database migrations and role administration.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! folio-cli migrate
//!
//! # Grant or revoke the admin role for a registered identity
//! folio-cli admin grant -e owner@example.com
//! folio-cli admin revoke -e owner@example.com
//!
//! # List role assignments
//! folio-cli admin list
//!
//! # Seed sample content
//! folio-cli seed --author-email owner@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin` - Manage role assignments
//! - `seed` - Seed the database with sample content

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use folio_core::AppRole;

mod commands;

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage role assignments
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with sample content
    Seed {
        /// Email of a registered identity to author the sample post
        #[arg(long)]
        author_email: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant a role to a registered identity
    Grant {
        /// Identity email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin`, `moderator`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: AppRole,
    },
    /// Revoke a role from an identity
    Revoke {
        /// Identity email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin`, `moderator`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: AppRole,
    },
    /// List every role assignment
    List,
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { email, role } => commands::admin::grant(&email, role).await?,
            AdminAction::Revoke { email, role } => commands::admin::revoke(&email, role).await?,
            AdminAction::List => commands::admin::list().await?,
        },
        Commands::Seed { author_email } => commands::seed::run(&author_email).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_grant_defaults_to_admin() {
        let cli = Cli::try_parse_from(["folio-cli", "admin", "grant", "-e", "owner@example.com"]);
        match cli.map(|cli| cli.command) {
            Ok(Commands::Admin {
                action: AdminAction::Grant { email, role },
            }) => {
                assert_eq!(email, "owner@example.com");
                assert_eq!(role, AppRole::Admin);
            }
            _ => panic!("expected `admin grant`"),
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(
            Cli::try_parse_from(["folio-cli", "admin", "revoke", "-e", "a@b.co", "-r", "root"])
                .is_err()
        );
    }
}
