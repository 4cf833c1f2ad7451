use clap::Parser;
use rx_doc_bot::core::ConfigProvider;
use rx_doc_bot::utils::{logger, validation::Validate};
use rx_doc_bot::{
    BotEngine, CliConfig, Dispatcher, DocumentPipeline, PrescriptionRenderer, TelegramClient,
    TomlConfig, WkhtmltopdfConverter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting rx-doc-bot");

    match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            let config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("❌ Failed to load config file '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            run(config, cli.monitor).await
        }
        None => {
            let monitor = cli.monitor;
            run(cli, monitor).await
        }
    }
}

async fn run<P: ConfigProvider + Validate>(config: P, monitor_override: bool) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let transport = match TelegramClient::new(config.api_base_url(), config.bot_token()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Could not build Telegram client: {}", e);
            std::process::exit(1);
        }
    };

    match transport.get_me().await {
        Ok(me) => tracing::info!(
            "✅ Authorized as @{} (id {})",
            me.username.as_deref().unwrap_or(&me.first_name),
            me.id
        ),
        Err(e) => {
            tracing::error!("❌ Bot token check failed: {}", e);
            std::process::exit(1);
        }
    }

    let renderer = PrescriptionRenderer::new()?;
    let converter = WkhtmltopdfConverter::new(config.converter_binary(), config.conversion_timeout())
        .with_extra_args(config.converter_args().to_vec());
    let pipeline = DocumentPipeline::new(renderer, converter);

    let monitor_enabled = monitor_override || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut engine = BotEngine::new_with_monitoring(
        Dispatcher::new(transport, pipeline),
        config.poll_timeout(),
        monitor_enabled,
    );

    engine
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("✅ rx-doc-bot stopped");
    Ok(())
}
