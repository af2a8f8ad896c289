use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use fse::config::{ConfigOverrides, ServerConfig, DEFAULT_DATABASE};
use fse::server::{self, MigrateDirection};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the REST API
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        /// Database path or connection URL
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
        /// YAML file with server settings; flags take precedence
        #[clap(short, long)]
        config: Option<PathBuf>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = DEFAULT_DATABASE)]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, default_value = DEFAULT_DATABASE)]
        database: String,
    },
    /// Load the sample facility network into an empty database
    Seed {
        #[clap(short, long, default_value = DEFAULT_DATABASE)]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
            config,
        } => {
            let config = ServerConfig::resolve(
                config.as_deref(),
                ConfigOverrides {
                    port,
                    database,
                    cors_origin,
                    log_level: args.log_level,
                },
            )?;
            setup_logging(Some(&config.log_level));

            info!("Starting server on port {}", config.port);
            server::start_server(&config).await?;
        }
        Commands::Db { command } => {
            setup_logging(args.log_level.as_deref());

            match command {
                DbCommands::Init { database } => {
                    info!("Initializing database: {}", database);
                    server::migrate_database(&database, MigrateDirection::Up).await?;
                }
                DbCommands::Migrate {
                    direction,
                    database,
                } => {
                    info!("Running database migration: {:?}", direction);
                    server::migrate_database(&database, direction).await?;
                }
                DbCommands::Seed { database } => {
                    info!("Seeding database: {}", database);
                    server::seed_database(&database).await?;
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(log_level: Option<&str>) {
    let log_level = match log_level.unwrap_or("info").to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins when set; sqlx statement logging stays quiet otherwise
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sqlx=warn,{}", log_level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
