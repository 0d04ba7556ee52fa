//! Schema migration runner
//!
//! Run with: cargo run --bin migration -- up
//!
//! Reads the database URL from `--database-url`, then `DATABASE_URL`, then the
//! application config.

use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use marketplace_api::{config, db, migrator::Migrator};

#[derive(Debug, Parser)]
#[command(name = "migration", about = "Manage the marketplace database schema")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", help = "Database connection string")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Up {
        #[arg(long, help = "Apply at most this many migrations")]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1, help = "Number of migrations to roll back")]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let database_url = match cli.database_url {
        Some(url) => url,
        None => config::load_config()?.database_url,
    };

    info!("Connecting to database: {}", database_url);
    let pool = db::establish_connection_with_config(&db::DbConfig {
        url: database_url,
        max_connections: 2,
        ..Default::default()
    })
    .await?;

    match cli.command {
        Command::Up { steps } => {
            Migrator::up(&pool, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&pool, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Command::Status => Migrator::status(&pool).await?,
        Command::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
