use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use portfolio_tracker::config::DatabaseConfig;
use portfolio_tracker::db;

#[derive(Parser)]
#[command(name = "portfolio-tracker", about = "Schéma du suivi de portefeuille boursier")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Crée les tables manquantes (par défaut)
    Init,
    /// Supprime puis recrée toutes les tables
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,sea_orm=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = DatabaseConfig::from_env()?;

    info!("connecting to database...");
    let db = match db::establish_connection(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("database connection failed: {}", e);
            return Err(e.into());
        }
    };
    info!("database connected");

    match cli.command.unwrap_or(Command::Init) {
        Command::Init => db::create_tables(&db).await?,
        Command::Reset => db::reset_db(&db).await?,
    }
    info!("schema ready");

    Ok(())
}
