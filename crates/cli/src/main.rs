mod error;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use github::{GitHubConfig, GitHubTool, GithubRouter};
use mcp::StdioService;
use mongo::{MongoConfig, MongoRouter, MongoTool};

use error::Result;

#[derive(Parser)]
#[command(name = "stevedore")]
#[command(about = "MCP stdio servers for GitHub and MongoDB", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the GitHub tool set over stdio
    Github,
    /// Serve the MongoDB tool set over stdio
    Mongo,
    /// Print the tool catalog and exit
    Tools,
}

#[tokio::main]
async fn main() {
    // Stdout carries the JSON-RPC stream; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Github => serve_github().await,
        Commands::Mongo => serve_mongo().await,
        Commands::Tools => {
            print_catalog();
            Ok(())
        }
    }
}

async fn serve_github() -> Result<()> {
    let config = GitHubConfig::from_env();
    info!(
        token_configured = config.token.is_some(),
        username_configured = config.username.is_some(),
        "starting GitHub tool set"
    );

    let tool = GitHubTool::new(config)?;
    StdioService::new(GithubRouter::new(tool)).run().await?;
    Ok(())
}

async fn serve_mongo() -> Result<()> {
    let config = MongoConfig::from_env();
    info!(database = %config.database, "starting MongoDB tool set");

    let tool = MongoTool::connect(config).await?;
    StdioService::new(MongoRouter::new(tool)).run().await?;
    Ok(())
}

fn print_catalog() {
    for entry in github::catalog().into_iter().chain(mongo::catalog()) {
        let category = serde_json::to_string(&entry.category)
            .unwrap_or_default()
            .trim_matches('"')
            .to_string();
        println!("{:<45} {category}", entry.name);
    }
}
