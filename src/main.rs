pub mod types;
pub mod config;
pub mod error;
pub mod source;
pub mod data;
pub mod geofilter;
pub mod validate;
pub mod marker;
pub mod surface;
pub mod display;
pub mod pipeline;
pub mod render;
pub mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use display::DisplaySync;
use surface::MapDocument;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both sources and write the static map site
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Overrides output.site_dir
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Load both sources and serve the map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::builder().gzip(true).build()?;

    match cli.command {
        Commands::Generate { config, out } => {
            info!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_or_default(&config)?;

            let mut display = DisplaySync::new(
                MapDocument::from_config(&app_config.map),
                app_config.display.count_mode,
            );
            pipeline::run_initial_load(&app_config, &client, &mut display).await;

            let out_dir = out.unwrap_or_else(|| app_config.output.site_dir.clone());
            render::write_site(display.surface(), &out_dir)?;

            info!("Generation complete!");
        }
        Commands::Serve { config } => {
            info!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_or_default(&config)?;

            let mut display = DisplaySync::new(
                MapDocument::from_config(&app_config.map),
                app_config.display.count_mode,
            );
            pipeline::run_initial_load(&app_config, &client, &mut display).await;

            server::start_server(app_config, client, display).await?;
        }
    }

    Ok(())
}
