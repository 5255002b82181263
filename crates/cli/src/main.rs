mod config_commands;
mod say_command;
mod session_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    quandary_channels::{ChannelOutbound, ConsoleOutbound},
    quandary_config::QuandaryConfig,
    quandary_gateway::{
        server::start_gateway, services, state::GatewayState,
        training_monitor::spawn_training_monitor,
    },
    quandary_messenger::MessengerOutbound,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "quandary", about = "Quandary: a bot that makes decisions for you")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/quandary/).
    #[arg(long, global = true, env = "QUANDARY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true, env = "QUANDARY_BIND")]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true, env = "PORT")]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default when no subcommand is provided).
    Gateway,
    /// Send one event through the bot and print its replies.
    Say(say_command::SayArgs),
    /// Inspect or reset stored conversations.
    Sessions {
        #[command(subcommand)]
        action: session_commands::SessionAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<QuandaryConfig> {
    match cli.config.as_deref() {
        Some(path) => quandary_config::load_config(path),
        None => Ok(quandary_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let mut config = load_config(&cli)?;
    if let Some(bind) = cli.bind.clone() {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        None | Some(Commands::Gateway) => run_gateway(config).await,
        Some(Commands::Say(args)) => say_command::handle_say(&config, args).await,
        Some(Commands::Sessions { action }) => {
            session_commands::handle_sessions(&config, action).await
        },
        Some(Commands::Config { action }) => {
            config_commands::handle_config(&config, cli.config.as_deref(), action)
        },
    }
}

async fn run_gateway(config: QuandaryConfig) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "quandary starting");

    let report = quandary_config::validate(&config);
    for d in &report.diagnostics {
        warn!(severity = %d.severity, path = %d.path, "{}", d.message);
    }

    let messenger = services::messenger_config(&config)?;
    let outbound: Arc<dyn ChannelOutbound> = match messenger.clone() {
        Some(account) => Arc::new(MessengerOutbound::new(account)),
        None => {
            warn!("no Messenger account configured; replies go to stdout");
            Arc::new(ConsoleOutbound::stdout())
        },
    };

    let bot = services::BotServices::from_config(&config, outbound).await?;
    let state = GatewayState::new(bot.dispatcher, messenger);

    #[cfg(feature = "metrics")]
    let state = state.with_metrics_handle(quandary_metrics::init_metrics(
        quandary_metrics::MetricsRecorderConfig {
            enabled: config.metrics.enabled,
            global_labels: Vec::new(),
        },
    )?);

    let state = Arc::new(state);
    spawn_training_monitor(Arc::clone(&state), bot.training_outcomes);
    start_gateway(state, &config.server.bind, config.server.port).await
}
