mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::run::RunArgs;
use skillflow_client::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER};

#[derive(Parser)]
#[command(
    name = "skillflow",
    about = "Invoke a remote workflow and stream its progress and results",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workflow service base URL
    #[arg(long, global = true, env = "SKILLFLOW_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// API key sent as a bearer token
    #[arg(long, global = true, env = "SKILLFLOW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Client identifier sent with each request
    #[arg(long, global = true, env = "SKILLFLOW_USER", default_value = DEFAULT_USER)]
    user: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log debug output to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow to completion and print its outputs
    Run(RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig {
        base_url: cli.api_url,
        api_key: cli.api_key,
        user: cli.user,
        ..Default::default()
    };

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(config, args, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
