use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use repscore_analysis::Analyzer;
use repscore_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "repscore-cli")]
#[command(about = "Reputation analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one comprehensive analysis and print it as JSON
    Analyze {
        /// Company name to analyze
        #[arg(long)]
        company: String,

        /// Free-form location, e.g. "Austin, TX"
        #[arg(long, default_value = "")]
        location: String,

        /// Company website; scored only when it starts with http:// or https://
        #[arg(long, default_value = "")]
        website: String,

        /// Print single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Database maintenance commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the configured database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = repscore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            company,
            location,
            website,
            compact,
        } => run_analyze(&config, &company, &location, &website, compact).await,
        Commands::Db { command } => run_db(&config, command).await,
    }
}

async fn run_analyze(
    config: &AppConfig,
    company: &str,
    location: &str,
    website: &str,
    compact: bool,
) -> anyhow::Result<()> {
    let store = repscore_db::open_store(config).await?;
    let analyzer = Analyzer::from_config(config, store)?;
    let analysis = analyzer.run_analysis(company, location, website).await?;

    let json = if compact {
        serde_json::to_string(&analysis)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{json}");
    Ok(())
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for db commands"))?;
    let pool =
        repscore_db::connect_pool(url, repscore_db::PoolConfig::from_app_config(config)).await?;

    match command {
        DbCommands::Ping => {
            repscore_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            repscore_db::run_migrations(&pool).await?;
            tracing::info!("migrations applied");
            println!("migrations applied");
        }
    }
    Ok(())
}
