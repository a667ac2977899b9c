use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use cutover_core::CutoverConfig;
use cutover_engine::BlueGreen;
use cutover_state::{StateStore, Topology};

mod commands;

use commands::{Format, Mode};

#[derive(Parser)]
#[command(
    name = "cutover",
    about = "Blue/green traffic cutover for a load balancer listener",
    version
)]
struct Cli {
    /// Name of the load balancer fronting both environments
    load_balancer: String,

    /// Operation: boot, healthcheck, swap or destroy
    mode: String,

    /// Local control plane database
    #[arg(long, default_value = "cutover.redb")]
    state: PathBuf,

    /// cutover.toml with listener, pairing and scaling settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Import a JSON topology into the state database before running
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Output format for status maps, plans and reports
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Log format on stderr
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// With `swap`: print the plan without applying it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let Some(mode) = Mode::parse(&cli.mode) else {
        println!("mode: NONE");
        return Ok(());
    };
    println!("mode: {}", mode.label());

    let config = match &cli.config {
        Some(path) => CutoverConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CutoverConfig::default(),
    };

    let store = StateStore::open(&cli.state)
        .with_context(|| format!("failed to open state {}", cli.state.display()))?;

    if let Some(seed) = &cli.seed {
        let json = std::fs::read_to_string(seed)
            .with_context(|| format!("failed to read seed {}", seed.display()))?;
        let topology = Topology::from_json(&json)
            .with_context(|| format!("invalid topology in {}", seed.display()))?;
        store.import(&topology)?;
        info!(seed = %seed.display(), "topology imported");
    }

    let blue_green = BlueGreen::with_config(&cli.load_balancer, store.clone(), store, config);
    let mut out = std::io::stdout().lock();
    commands::run(&blue_green, mode, cli.format, cli.dry_run, &mut out)
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("cutover=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
