use appstore_client::app::describe_endpoints;
use appstore_client::config::Command;
use appstore_client::utils::error::{ErrorSeverity, StoreError};
use appstore_client::utils::{logger, validation::Validate};
use appstore_client::{CliConfig, ClientConfig, CommandRunner, ConfigProvider, HttpStoreApi, StoreRepository};
use clap::Parser;
use serde_json::Value;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 解析並驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => Some(config),
        // Listing endpoints needs no backend.
        Err(_) if matches!(cli.command, Command::Endpoints) => None,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Configuration validation failed: {}", e);
            fail(&e);
        }
    };

    // 初始化日誌
    match &config {
        Some(config) if config.json_logs() => {
            let level = if cli.verbose {
                "debug"
            } else {
                config.logging.level.as_deref().unwrap_or("info")
            };
            logger::init_json_logger(level);
        }
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("🚀 Starting appstore-client CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let result = match config {
        Some(config) => run(&cli, &config).await,
        None => Ok(describe_endpoints()),
    };

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                tracing::info!("✅ Command completed");
                println!("{}", text);
            }
            Err(e) => fail(&StoreError::from(e)),
        },
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e);
        }
    }
}

async fn run(cli: &CliConfig, config: &ClientConfig) -> appstore_client::Result<Value> {
    tracing::debug!(base_url = config.base_url(), dialect = %config.dialect(), "🌐 backend selected");

    // 建立傳輸層與存取層
    let api = HttpStoreApi::new(config)?;
    let repo = StoreRepository::new(api).with_max_page_size(config.max_page_size());
    let runner = CommandRunner::new(&repo, config.retry_policy(), config.default_page_size());

    runner.run(&cli.command).await
}

fn fail(e: &StoreError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
