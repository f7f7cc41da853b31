//! Mais Saúde CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ms-cli migrate storefront
//!
//! # Run admin database migrations
//! ms-cli migrate admin
//!
//! # Run all database migrations
//! ms-cli migrate all
//!
//! # Create an admin user (password from --password or MS_ADMIN_PASSWORD)
//! ms-cli admin create -e gerente@maissaude.com.br -n "Gerente" -r super_admin
//!
//! # Load categories and products from YAML
//! ms-cli seed catalog data/catalogo.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Operations tooling for the Mais Saúde storefront and back-office.
#[derive(Parser)]
#[command(name = "ms-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending SQL migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Back-office accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// `shop` schema and customer sessions
    Storefront,
    /// `admin` schema
    Admin,
    /// Storefront first, then admin
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an account
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        name: String,

        /// One of `super_admin`, `admin`, `viewer`
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// At least 12 characters
        #[arg(short, long, env = "MS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Insert categories and products from a YAML file, skipping existing slugs
    Catalog {
        /// YAML file with `categories`, each listing its `products`
        file: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .init();

    match run(Cli::parse().command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    use commands::{admin, migrate, seed};

    match command {
        Commands::Migrate { target: MigrateTarget::Storefront } => migrate::storefront().await?,
        Commands::Migrate { target: MigrateTarget::Admin } => migrate::admin().await?,
        Commands::Migrate { target: MigrateTarget::All } => {
            migrate::storefront().await?;
            migrate::admin().await?;
        }
        Commands::Admin {
            action: AdminAction::Create { email, name, role, password },
        } => admin::create_user(&email, &name, &role, &password).await?,
        Commands::Seed { action: SeedAction::Catalog { file } } => seed::catalog(&file).await?,
    }
    Ok(())
}
