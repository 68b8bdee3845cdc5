mod alert;
mod catalog;
mod pipeline;
mod track;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "caskwatch")]
#[command(about = "Track ABC store inventory and alert subscribers to new allocations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll the enabled sources and update the snapshot file.
    Track(TrackArgs),
    /// Compare snapshot files and alert matching subscribers.
    Alert(AlertArgs),
    /// Track, then alert on what changed since the previous snapshot.
    Run(RunArgs),
    /// Probe VA ABC store numbers and write the valid ones to a store list.
    DiscoverStores(DiscoverStoresArgs),
    /// Download the NC ABC warehouse stock list as the Wake catalog.
    NcCatalog(NcCatalogArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct TrackArgs {
    /// Newline-delimited VA ABC store numbers.
    #[arg(long, default_value = "stores")]
    pub(crate) stores: PathBuf,
    /// VA product map, a JSON object of code to name.
    #[arg(long, default_value = "products.json")]
    pub(crate) products: PathBuf,
    /// NC ABC catalog used by the Wake County source.
    #[arg(long = "nc-products", default_value = "nc-products.json")]
    pub(crate) nc_products: PathBuf,
    /// Snapshot file; read as the prior state and rewritten with the result.
    #[arg(long, default_value = "inventory.json")]
    pub(crate) output: PathBuf,
    /// Skip the Virginia ABC source.
    #[arg(long = "no-va")]
    pub(crate) no_va: bool,
    /// Enable the Wake County ABC source.
    #[arg(long)]
    pub(crate) wake: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AlertArgs {
    /// Prior snapshot files; missing files count as empty.
    #[arg(long, num_args = 1..)]
    pub(crate) previous: Vec<PathBuf>,
    /// Current snapshot files.
    #[arg(long, num_args = 1.., required = true)]
    pub(crate) current: Vec<PathBuf>,
    /// Subscriber config (JSON, or YAML by extension).
    #[arg(long, env = "CASKWATCH_SUBSCRIPTIONS")]
    pub(crate) subscriptions: Option<PathBuf>,
    /// Print alert previews instead of sending.
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) track: TrackArgs,
    /// Subscriber config (JSON, or YAML by extension).
    #[arg(long, env = "CASKWATCH_SUBSCRIPTIONS")]
    pub(crate) subscriptions: Option<PathBuf>,
    /// Print alert previews instead of sending.
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct DiscoverStoresArgs {
    #[arg(long, default_value = "stores")]
    pub(crate) output: PathBuf,
    /// Lowest store number to probe.
    #[arg(long, default_value_t = 0)]
    pub(crate) first: u32,
    /// Highest store number to probe.
    #[arg(long, default_value_t = 499)]
    pub(crate) last: u32,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct NcCatalogArgs {
    #[arg(long, default_value = "nc-products.json")]
    pub(crate) output: PathBuf,
    /// Keep only this listing type (Listed, Limited, Allocation, Barrel, Christmas).
    #[arg(long)]
    pub(crate) listing: Option<String>,
    /// Keep only products with at least this many cases in the warehouse.
    #[arg(long, default_value_t = 0)]
    pub(crate) min_cases: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = caskwatch_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Track(args) => track::run_track(&config, &args).await.map(|_| ()),
        Commands::Alert(args) => alert::run_alert(&config, &args).await,
        Commands::Run(args) => pipeline::run_cycle(&config, &args).await,
        Commands::DiscoverStores(args) => catalog::run_discover_stores(&config, &args).await,
        Commands::NcCatalog(args) => catalog::run_nc_catalog(&config, &args).await,
    }
}
