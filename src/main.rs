use anyhow::Result;
use clap::Parser;
use commute_grid::commands::{self, AssembleOptions, CollectOptions, GlobalOptions};
use commute_grid::config::DEFAULT_CONFIG_FILE;
use commute_grid::distance::TravelMode;
use commute_grid::schedule::CommuteSchedule;
use jiff::civil::{Date, Time};
use std::path::PathBuf;

/// commute-grid - commute distances over a city grid
///
/// Queries the Distance Matrix API for the morning and evening commute
/// between every grid point and the city hall, then assembles the saved
/// payloads into one results file per city.
///
/// The API key is read from DISTANCE_MATRIX_API_KEY in the settings file,
/// or from the environment when the file does not set it.
///
/// Examples:
///   commute-grid collect --city "New York City"
///   commute-grid collect --city chicago --mode transit --force
///   commute-grid assemble --city "New York City"
#[derive(Parser, Debug)]
#[command(author, version = env!("COMMUTE_GRID_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding grid points, payloads and results
    #[arg(
        long = "data-dir",
        short = 'd',
        env = "COMMUTE_GRID_DATA_DIR",
        value_name = "PATH",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Settings file with the API key
    #[arg(
        long,
        env = "COMMUTE_GRID_CONFIG",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub config: PathBuf,

    /// Distance Matrix endpoint (defaults to the Google Maps endpoint)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Log progress
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Query and save distance payloads for a city
    Collect(CollectArgs),

    /// Combine saved payloads into results-{city}.json
    Assemble(AssembleArgs),
}

#[derive(clap::Args, Debug)]
pub struct CollectArgs {
    /// City name or slug, e.g. "New York City" or new-york-city
    #[arg(long)]
    pub city: String,

    /// Grid points file (defaults to points-{city}.json in the data directory)
    #[arg(long, value_name = "PATH")]
    pub points: Option<PathBuf>,

    /// Travel mode to query; repeat for several (defaults to all)
    #[arg(long = "mode", short = 'm', value_name = "MODE")]
    pub modes: Vec<TravelMode>,

    /// Local date of the commute
    #[arg(long, value_name = "YYYY-MM-DD", default_value = "2020-12-02")]
    pub workday: Date,

    /// Local time the morning commute must arrive by
    #[arg(long = "arrive-by", value_name = "HH:MM:SS", default_value = "09:00:00")]
    pub arrive_by: Time,

    /// Local time the evening commute leaves
    #[arg(long = "depart-at", value_name = "HH:MM:SS", default_value = "17:00:00")]
    pub depart_at: Time,

    /// Query again even when a payload file already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct AssembleArgs {
    /// City name or slug
    #[arg(long)]
    pub city: String,

    /// Grid points file (defaults to points-{city}.json in the data directory)
    #[arg(long, value_name = "PATH")]
    pub points: Option<PathBuf>,

    /// Travel mode to include; repeat for several (defaults to all)
    #[arg(long = "mode", short = 'm', value_name = "MODE")]
    pub modes: Vec<TravelMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = commute_grid::runtime::RealRuntime;
    let global = GlobalOptions {
        data_dir: cli.data_dir,
        config: cli.config,
        api_url: cli.api_url,
    };

    match cli.command {
        Commands::Collect(args) => {
            let options = CollectOptions {
                city: args.city,
                points: args.points,
                modes: args.modes,
                schedule: CommuteSchedule {
                    workday: args.workday,
                    arrive_by: args.arrive_by,
                    depart_at: args.depart_at,
                },
                force: args.force,
            };
            commands::collect(runtime, &global, options).await?
        }
        Commands::Assemble(args) => {
            let options = AssembleOptions {
                city: args.city,
                points: args.points,
                modes: args.modes,
            };
            commands::assemble(runtime, &global, options)?
        }
    }
    Ok(())
}
