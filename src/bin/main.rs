use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "recobot")]
#[command(about = "Movie and show recommendation chat", long_about = None)]
struct Args {
    /// YAML config file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[arg(short, long, global = true)]
    debug: bool,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP greeting server.
    Serve,
    /// Chat in the terminal.
    Chat {
        /// Answer from the built-in genre catalog instead of the gateway.
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "recobot_rs=debug,tower_http=debug"
    } else {
        "recobot_rs=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            args.json_logs
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.json_logs)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let result = match recobot_rs::load_config(args.config.as_deref(), args.debug) {
        Ok(config) => match args.command {
            Command::Serve => recobot_rs::serve(config).await,
            Command::Chat { offline } => recobot_rs::chat(config, offline).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
