mod apps_commands;
mod auth_commands;
mod session;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "connector-auth",
    about = "Authorize an app against the cloud connector and print its credentials",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// App profiles file (default: ~/.config/connector-auth/apps.yaml).
    #[arg(long, global = true, env = "CONNECTOR_AUTH_PROFILES")]
    profiles: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the authorization URL and wait for the connector callback.
    Login(auth_commands::LoginArgs),
    /// Decrypt a callback result offline.
    Decrypt(auth_commands::DecryptArgs),
    /// List configured app profiles.
    Apps,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr; stdout carries the rendered credentials.
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "connector-auth starting");

    let profiles = cli.profiles.as_deref();
    match cli.command {
        Commands::Login(args) => auth_commands::login(args, profiles).await,
        Commands::Decrypt(args) => auth_commands::decrypt(args, profiles),
        Commands::Apps => apps_commands::list(profiles),
    }
}
