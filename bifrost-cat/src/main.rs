//! bifrost-cat — entry point.
//!
//! ```text
//! bifrost-cat                        Connect using bifrost-cat.toml or defaults
//! bifrost-cat --host h --port p      Override the server address
//! bifrost-cat --json                 Print server lines as JSON arrays
//! bifrost-cat --config <path>        Load a custom config TOML
//! bifrost-cat --gen-config           Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bifrost_cat::config::CatConfig;
use bifrost_cat::session::{self, SessionOptions};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bifrost-cat", about = "Talk to a BAPS3 server line by line")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "bifrost-cat.toml")]
    config: PathBuf,

    /// Server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Print server lines as JSON arrays.
    #[arg(long)]
    json: bool,

    /// Reject server lines longer than this many bytes (0 = unbounded).
    #[arg(long)]
    max_line_length: Option<usize>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&CatConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config, then apply flag overrides.
    let mut config = CatConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.network.host = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    if let Some(max) = cli.max_line_length {
        config.codec.max_line_length = max;
    }
    config.output.json |= cli.json;

    // Init tracing. Logs go to stderr so stdout carries only protocol lines.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("bifrost-cat v{}", env!("CARGO_PKG_VERSION"));
    let addr = config.address();
    let stream = TcpStream::connect(&addr).await?;
    info!("connected to {addr}");

    let opts = SessionOptions {
        json: config.output.json,
        max_line_length: config.max_line_length(),
    };
    let stats = session::run(stream, tokio::io::stdin(), tokio::io::stdout(), &opts).await?;
    info!("sent {} lines, received {}", stats.sent, stats.received);

    Ok(())
}
