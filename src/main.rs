use clap::{Parser, Subcommand};

use classroom_bot::application::errors::BotError;
use classroom_bot::application::messaging::MessageDispatcher;
use classroom_bot::domain::traits::Bot;
use classroom_bot::infrastructure::adapters::console::ConsoleAdapter;
use classroom_bot::infrastructure::adapters::discord::DiscordAdapter;
use classroom_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "classroom-bot")]
#[command(about = "A Discord bot for joining and leaving classes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Discord token (overrides config and DISCORD_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env loaded: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(cli.config, cli.token),
        Commands::Version => {
            println!("classroom-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if !std::path::Path::new(config_path).exists() {
        return Config::load_env();
    }

    match Config::load(config_path) {
        Ok(config) => config.with_env(),
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) -> Result<(), BotError> {
    let mut config = load_config(&config_path);
    if let Some(token) = token_override {
        config.set_token(token);
    }
    config.validate()?;

    tracing::info!("Starting {}", config.bot.name);

    let dispatcher = MessageDispatcher::for_classes(&config.bot.prefix, &config.classes.manage_channel);
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    if let Some(token) = config.discord_token() {
        let bot = DiscordAdapter::new(token, &config.bot.name, dispatcher);
        rt.block_on(bot.start())
    } else if config.console_enabled() {
        // Run console bot (dev mode)
        tracing::warn!("No Discord token configured, starting console mode");
        let bot = ConsoleAdapter::new(dispatcher, config.console_user(), &config.classes.manage_channel);
        rt.block_on(bot.start())
    } else {
        Err(BotError::Config(
            "no Discord token configured and the console adapter is disabled".to_string(),
        ))
    }
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
