//! Local Crust CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! crust-cli migrate
//!
//! # Create admin account (password from CRUST_ADMIN_PASSWORD or stdin)
//! crust-cli admin create -u ops -e ops@localcrust.in -f "Ops Team" -r super_admin
//!
//! # Seed verified bakers and their products
//! crust-cli seed --file marketplace.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin accounts
//! - `seed` - Seed bakers and catalogues from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "crust-cli")]
#[command(author, version, about = "Local Crust CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed bakers and products from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        full_name: String,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                full_name,
                role,
            } => {
                commands::admin::create(&username, &email, &full_name, &role).await?;
            }
        },
        Commands::Seed { file } => {
            let summary = commands::seed::bakers(&file).await?;
            if summary.failed > 0 {
                return Err(format!("{} bakers failed to seed", summary.failed).into());
            }
        }
    }
    Ok(())
}
