use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use peerlink_config::{ConfigLoader, PeerlinkConfig};
use peerlink_peer::MembershipEvent;

use crate::replay::{Replay, load_script};

/// peerlink — peer-group membership and keyed-data exchange endpoint
#[derive(Parser)]
#[command(name = "peerlink", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to peerlink.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON script of membership events and record operations
    Replay {
        /// Path to the script (a JSON array of steps)
        script: PathBuf,
        /// Keep local writes out of the remote view until a `propagate` step
        #[arg(long)]
        no_loopback: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the transport hook names the endpoint reacts to
    Hooks,
}

impl Cli {
    pub fn run(self) -> peerlink_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(config.logging.level.as_str())
        };
        init_tracing(&config, log_level);

        match self.command {
            Commands::Replay {
                script,
                no_loopback,
            } => Self::cmd_replay(&config, script, !no_loopback),
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Hooks => Self::cmd_hooks(&config),
        }
    }

    fn cmd_replay(
        config: &PeerlinkConfig,
        script: PathBuf,
        loopback: bool,
    ) -> peerlink_core::Result<()> {
        let steps = load_script(&script)?;
        info!(script = %script.display(), steps = steps.len(), loopback, "replaying script");

        let mut replay = Replay::new(&config.endpoint, loopback);
        for line in replay.run(&steps)? {
            println!("{line}");
        }

        let endpoint = replay.endpoint();
        println!();
        println!("state:    {}", endpoint.state());
        println!("flags:    {}", endpoint.raised_flags().join(", "));
        let bindings: Vec<String> = endpoint
            .list_binding_identifiers()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("bindings: {}", bindings.join(", "));
        Ok(())
    }

    fn cmd_config(config: &PeerlinkConfig, json: bool) -> peerlink_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| peerlink_core::PeerError::Config(e.to_string()))?;
            println!("{rendered}");
        }
        Ok(())
    }

    fn cmd_hooks(config: &PeerlinkConfig) -> peerlink_core::Result<()> {
        for event in MembershipEvent::ALL {
            println!("{}", event.hook_name(&config.endpoint.name));
        }
        Ok(())
    }
}

fn init_tracing(config: &PeerlinkConfig, log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    // Logs go to stderr so replay output stays clean on stdout.
    match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
    }
}
