mod cli;
mod config;
mod llm;

use clap::Parser;
use cli::{Cli, Commands};
use config::SlidecraftConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config).await,
        Commands::Templates(args) => cli::templates::run(args).await,
        Commands::Run(args) => {
            let config = SlidecraftConfig::load_or_default(&cli.config)?.with_data_dir(cli.data_dir);
            info!("Slidecraft v{}", env!("CARGO_PKG_VERSION"));
            info!("Data: {:?}", config.data_dir);
            cli::run::run(args, config).await
        }
        Commands::Show(args) => {
            let config = SlidecraftConfig::load_or_default(&cli.config)?.with_data_dir(cli.data_dir);
            cli::show::run(args, &config).await
        }
    }
}
