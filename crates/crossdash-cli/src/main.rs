mod lookup;
mod session;

use clap::{Parser, Subcommand};
use crossdash_core::Coordinate;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crossdash")]
#[command(about = "Emergency-response routing session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full session: locate, resolve, count down, and route on reveal.
    ///
    /// Each non-blank stdin line is shown as advisory guidance; a blank line
    /// hides it again.
    Run {
        /// Use this latitude instead of the configured location capability
        #[arg(long, allow_negative_numbers = true, requires = "lng")]
        lat: Option<f64>,
        /// Use this longitude instead of the configured location capability
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lng: Option<f64>,
        /// Advisory text to reveal as soon as the session starts
        #[arg(long)]
        advisory: Option<String>,
        /// Audio reference accompanying `--advisory`
        #[arg(long, requires = "advisory")]
        audio: Option<String>,
    },
    /// Resolve a coordinate to an address, facilities and ETA estimates
    Resolve {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Compute a driving route between two points given as "lat,lng"
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,
        /// Print the full route as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = crossdash_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Run {
            lat,
            lng,
            advisory,
            audio,
        } => {
            let fixed = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
                _ => None,
            };
            session::run_session(&config, fixed, advisory, audio).await
        }
        Commands::Resolve { lat, lng } => {
            lookup::run_resolve(&config, Coordinate::new(lat, lng)?).await
        }
        Commands::Route { from, to, json } => lookup::run_route(&config, from, to, json).await,
    }
}

#[cfg(test)]
mod tests;
