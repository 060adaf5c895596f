use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

mod batch;
mod broker;
mod commands;
mod config;
mod core;
mod logging;
mod store;

/// RabbitHole - a RabbitMQ message utility
#[derive(Parser)]
#[command(name = "rabbithole")]
#[command(version = "1.0.0")]
#[command(about = "A RabbitMQ message utility: snag, replay and requeue messages \
through the broker's management API")]
struct Cli {
    /// Configuration file path (default: ~/.rabbithole.toml, then ./.rabbithole.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RabbitMQ host URL, scheme included
    #[arg(short = 'r', long)]
    host: Option<String>,

    /// RabbitMQ management port
    #[arg(short, long)]
    port: Option<u16>,

    /// URL-encoded RabbitMQ vhost name
    #[arg(short = 's', long)]
    vhost: Option<String>,

    /// RabbitMQ username
    #[arg(short, long)]
    username: Option<String>,

    /// RabbitMQ password
    #[arg(short = 'P', long)]
    password: Option<String>,

    /// Report what would be published without calling the broker
    #[arg(long)]
    simulate: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    silent: bool,

    /// Maximum number of concurrent publish workers for batch operations
    #[arg(long)]
    max_workers: Option<usize>,

    /// Attempt every file in a batch instead of stopping at the first failure
    #[arg(long)]
    keep_going: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Snags messages from a queue and saves them to a JSON-formatted file
    Snag {
        /// The source queue to get the messages from
        #[arg(short, long)]
        queue: String,

        /// The number of messages to get
        #[arg(short = 'm', long)]
        count: u32,

        /// The file to save the messages to
        #[arg(short = 'a', long)]
        file: PathBuf,
    },

    /// Replays messages from one queue onto another
    Replay {
        /// The source queue to get the messages from
        #[arg(short, long)]
        queue: String,

        /// The number of messages to replay
        #[arg(short = 'm', long)]
        count: u32,

        /// The destination queue
        #[arg(short, long)]
        destination: String,
    },

    /// Sends messages to a queue from a JSON-formatted file or folder
    Queue {
        /// The message source file or folder
        #[arg(short = 'f', long)]
        source: PathBuf,

        /// The destination queue (auto-detected from message headers when omitted)
        #[arg(short, long)]
        destination: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging with the specified level, adjusted for the
    // verbosity flags
    logging::init_logging(logging::effective_level(
        &cli.log_level,
        cli.verbose,
        cli.silent,
    ));

    // Resolve the final configuration snapshot: command line over config
    // file over built-in defaults
    let file_config = config::load_file_config(cli.config.as_deref());
    let overrides = config::Overrides {
        host: cli.host,
        port: cli.port,
        vhost: cli.vhost,
        username: cli.username,
        password: cli.password,
        simulate: cli.simulate,
        verbose: cli.verbose,
        silent: cli.silent,
        keep_going: cli.keep_going,
        max_workers: cli.max_workers,
        ..config::Overrides::default()
    };
    let settings = config::resolve(overrides, file_config);

    if settings.verbose {
        tracing::debug!("Host URL: {}", settings.host);
        tracing::debug!("    Port: {}", settings.port);
        tracing::debug!("   VHost: {}", settings.vhost);
        tracing::debug!(" Workers: {}", settings.max_workers);
    }

    if settings.simulate {
        tracing::info!("Simulate mode is on: nothing will be published");
    }

    let start = Instant::now();

    let result = match &cli.command {
        Command::Snag { queue, count, file } => {
            commands::snag::run(&settings, queue, *count, file).await
        }
        Command::Replay {
            queue,
            count,
            destination,
        } => commands::replay::run(&settings, queue, *count, destination).await,
        Command::Queue {
            source,
            destination,
        } => commands::queue::run(&settings, source, destination.as_deref()).await,
    };

    match result {
        Ok(()) => {
            tracing::info!("Done in {:.2?}!", start.elapsed());
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
