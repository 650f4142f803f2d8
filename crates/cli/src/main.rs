use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "uniscrape")]
#[command(about = "Deribit market-data subscription scraper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the gateway (control-plane HTTP server) and the subscription session.
    Serve {
        /// Config file path (default: UNISCRAPE_CONFIG_PATH or ~/.uniscrape/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8642)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the session state of a running gateway.
    Status {
        /// Config file path (default: UNISCRAPE_CONFIG_PATH or ~/.uniscrape/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8642)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("uniscrape {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Status { config, port }) => {
            if let Err(e) = run_status(config, port).await {
                log::error!("status failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{}",
        config.gateway.bind,
        config.gateway.port
    );
    lib::gateway::run_gateway(config).await
}

async fn run_status(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    let url = format!(
        "http://{}:{}/deribit/state",
        config.gateway.bind.trim(),
        config.gateway.port
    );
    let res = reqwest::get(&url)
        .await
        .with_context(|| format!("requesting {}", url))?;
    let state = res.text().await.context("reading state response")?;
    println!("{}", state);
    Ok(())
}
