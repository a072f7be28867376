//! Asterisk AMI - Manager Interface Client Binary
//!
//! Runs a single collection cycle against an Asterisk server and prints the
//! result. Scheduling is left to whatever invokes the binary.

use anyhow::Context;
use asterisk_ami::{
    metrics::collector, AmiConfig, AmiSession, AsteriskCollector, AsteriskSnapshot, MetricSink,
    MetricsProvider, PeerKind, PrefixedSink, DEFAULT_AMI_PORT, DEFAULT_METRIC_PREFIX,
    DEFAULT_READ_TIMEOUT_MS,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, level_filters::LevelFilter, Level, Subscriber};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "asterisk_ami")]
#[command(about = "Asterisk Manager Interface peer and channel statistics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Logs in to an Asterisk manager, collects peer and channel statistics and prints them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Asterisk manager host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Asterisk manager port
    #[arg(short, long, default_value_t = DEFAULT_AMI_PORT)]
    port: u16,

    /// Manager username
    #[arg(short, long, env = "AMI_USERNAME", default_value = "")]
    username: String,

    /// Manager secret
    #[arg(short, long, env = "AMI_SECRET", default_value = "", hide_env_values = true)]
    secret: String,

    /// Socket read timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_READ_TIMEOUT_MS)]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect a full snapshot (default)
    Snapshot(SnapshotArgs),

    /// Print one `name value` line per metric
    Metrics(MetricsArgs),

    /// List configured peers as JSON
    Peers(PeersArgs),

    /// Show channel statistics as JSON
    Channels,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[derive(Args)]
struct MetricsArgs {
    /// Metric path prefix
    #[arg(long, default_value = DEFAULT_METRIC_PREFIX)]
    prefix: String,
}

#[derive(Args)]
struct PeersArgs {
    /// Peer type: sip or iax
    kind: PeerKind,
}

/// Writes metrics to stdout.
struct StdoutSink;

impl MetricSink for StdoutSink {
    fn publish(&mut self, name: &str, value: u64) {
        println!("{} {}", name, value);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let config = AmiConfig::new(&cli.host, cli.port)
        .with_credentials(&cli.username, &cli.secret)
        .with_read_timeout_ms(cli.timeout);
    info!("Using AMI endpoint {}", config.socket_address());

    match &cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(config, &args.format).await?,
        Some(Commands::Metrics(args)) => metrics_command(config, args).await?,
        Some(Commands::Peers(args)) => peers_command(config, args.kind)?,
        Some(Commands::Channels) => channels_command(config)?,
        None => snapshot_command(config, "pretty").await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let subscriber = build_subscriber(cli, std::env::var("RUST_LOG").ok());
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn log_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// `RUST_LOG` directives, when given, refine the level chosen by the flags.
fn build_subscriber(cli: &Cli, directives: Option<String>) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level(cli)).into())
        .parse_lossy(directives.unwrap_or_default());

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
}

async fn snapshot_command(config: AmiConfig, format: &str) -> anyhow::Result<()> {
    if !matches!(format, "json" | "pretty") {
        anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", format);
    }

    let mut collector = AsteriskCollector::new(config)?;
    let snapshot = collector
        .collect_snapshot()
        .await
        .context("Failed to collect Asterisk snapshot")?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_pretty_snapshot(&snapshot);
    }

    Ok(())
}

async fn metrics_command(config: AmiConfig, args: &MetricsArgs) -> anyhow::Result<()> {
    let mut collector = AsteriskCollector::new(config)?;
    let snapshot = collector
        .collect_snapshot()
        .await
        .context("Failed to collect Asterisk metrics")?;

    let mut sink = PrefixedSink::new(args.prefix.clone(), StdoutSink);
    collector::publish(&snapshot, &mut sink);

    Ok(())
}

/// Connect and log in, failing loudly on rejected credentials.
fn open_session(config: AmiConfig) -> anyhow::Result<AmiSession> {
    let address = config.socket_address();
    let mut session = AmiSession::connect(config)
        .with_context(|| format!("Failed to connect to {}", address))?;
    if !session.login()? {
        session.disconnect();
        anyhow::bail!("Login to {} was rejected", address);
    }
    Ok(session)
}

fn peers_command(config: AmiConfig, kind: PeerKind) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let peers = session.list_peers(kind);
    session.disconnect();

    println!("{}", serde_json::to_string_pretty(&peers?)?);
    Ok(())
}

fn channels_command(config: AmiConfig) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let stats = session.channel_stats();
    session.disconnect();

    println!("{}", serde_json::to_string_pretty(&stats?)?);
    Ok(())
}

fn print_pretty_snapshot(snapshot: &AsteriskSnapshot) {
    println!(
        "Asterisk Snapshot ({})",
        chrono::DateTime::from_timestamp_millis(snapshot.timestamp as i64)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");
    println!();

    if !snapshot.authenticated {
        println!("Login rejected: counters below are not meaningful");
        println!();
    }

    println!("Peers:");
    println!(
        "  IAX: {} total, {} connected",
        snapshot.peers.iax_peers_total, snapshot.peers.iax_peers_connected
    );
    println!(
        "  SIP: {} total, {} connected",
        snapshot.peers.sip_peers_total, snapshot.peers.sip_peers_connected
    );
    println!();

    println!("Channels:");
    println!("  Active channels: {}", snapshot.channels.active_channels);
    println!("  Active calls: {}", snapshot.channels.active_calls);
    println!("  Calls processed: {}", snapshot.channels.calls_processed);
    println!("  SIP channels: {}", snapshot.channels.sip_channels);
    println!("  IAX2 channels: {}", snapshot.channels.iax_channels);
}
