use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use tczc_bot::application::messaging::Gatekeeper;
use tczc_bot::application::services::{MessageService, ReplyService};
use tczc_bot::domain::entities::InboundEvent;
use tczc_bot::domain::traits::Bot;
use tczc_bot::infrastructure::adapters::{ConsoleAdapter, LineAdapter};
use tczc_bot::infrastructure::config::Config;
use tczc_bot::infrastructure::llm::{GeminiProvider, LLM};
use tczc_bot::infrastructure::server::{self, AppState};
use tczc_bot::infrastructure::weather::WttrClient;

#[derive(Parser)]
#[command(name = "tczc-bot")]
#[command(about = "LINE webhook responder for the TCZC car club", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Run,
    /// Chat with the router on stdin (dev mode, nothing is sent to LINE)
    Console,
    /// List Gemini models that support text generation
    Models,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("tczc-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
        Commands::Run => {
            let config = load_config(&cli.config, cli.port);
            block_on(run_server(config))
        }
        Commands::Console => {
            let config = load_config(&cli.config, cli.port);
            block_on(run_console(config))
        }
        Commands::Models => {
            let config = load_config(&cli.config, cli.port);
            block_on(list_models(config))
        }
    }
}

fn block_on<F: std::future::Future<Output = ExitCode>>(future: F) -> ExitCode {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(future),
        Err(e) => {
            tracing::error!("Failed to start tokio runtime: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &str, port_override: Option<u16>) -> Config {
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(port) = port_override {
        config.server.port = port;
    }
    config
}

/// Build the reply producers. The Gemini client is optional.
fn build_replies(config: &Config) -> ReplyService {
    let weather = Arc::new(WttrClient::new(&config.weather));

    let llm: Option<Arc<dyn LLM>> = match config.llm.api_key() {
        Some(key) => {
            tracing::info!("Using Gemini {} for unmatched commands", config.llm.model);
            Some(Arc::new(
                GeminiProvider::new(key, Some(&config.llm.model)).with_base_url(&config.llm.base_url),
            ))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, unmatched commands get no reply");
            None
        }
    };

    ReplyService::new(weather, llm, config.llm.clone())
}

async fn run_server(config: Config) -> ExitCode {
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Starting {}", config.bot.name);

    // validate() guarantees both are present
    let secret = config.line.channel_secret.clone().unwrap_or_default();
    let token = config.line.channel_access_token.clone().unwrap_or_default();

    let mut bot = LineAdapter::new(token).with_api_base(&config.line.api_base);
    match bot.fetch_bot_info().await {
        Ok(()) => {
            let info = bot.bot_info();
            tracing::info!("Bot started: {} ({})", info.name, info.basic_id.unwrap_or(info.id));
        }
        Err(e) => tracing::warn!("Failed to fetch bot info: {}", e),
    }

    let service = MessageService::new(bot, Gatekeeper::from_config(&config.bot), build_replies(&config));
    let state = Arc::new(AppState {
        service: Arc::new(service),
        channel_secret: secret,
    });
    let app = server::router(state, &config.server.webhook_path);

    match server::serve(app, &config.server).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_console(config: Config) -> ExitCode {
    let service = MessageService::new(
        ConsoleAdapter::new(),
        Gatekeeper::from_config(&config.bot),
        build_replies(&config),
    );

    let info = service.bot().bot_info();
    tracing::info!("Console mode for {} (prefix commands with '{}', Ctrl-D to quit)", info.name, config.bot.marker);

    while let Some(input) = service.bot().read_line("> ").await {
        if input.trim().is_empty() {
            continue;
        }

        let event = InboundEvent::text("console", input);
        if let Err(e) = service.handle_event(&event).await {
            tracing::error!("Failed to handle input: {}", e);
        }
    }

    ExitCode::SUCCESS
}

async fn list_models(config: Config) -> ExitCode {
    let Some(key) = config.llm.api_key() else {
        tracing::error!("GEMINI_API_KEY not set");
        return ExitCode::FAILURE;
    };

    let provider = GeminiProvider::new(key, None).with_base_url(&config.llm.base_url);
    match provider.list_models().await {
        Ok(models) if models.is_empty() => {
            println!("No models supporting generateContent were found.");
            ExitCode::SUCCESS
        }
        Ok(models) => {
            for model in &models {
                println!("✅ {}", model.label());
            }
            println!("\nSet one of these as GEMINI_MODEL or llm.model in config.yaml.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to list models: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_config() -> ExitCode {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
