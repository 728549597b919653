use anyhow::Context;
use card_scan::core::ConfigProvider;
use card_scan::utils::error::ErrorSeverity;
use card_scan::utils::{logger, validation::Validate};
use card_scan::{CliConfig, GeminiBackend, LocalStorage, ScanConfig, ScanEngine, ScanReport};
use clap::Parser;
use std::sync::Arc;

async fn run<C: ConfigProvider + Validate>(
    config: C,
    images: &[String],
) -> card_scan::Result<ScanReport> {
    config.validate()?;

    let backend = Arc::new(GeminiBackend::new(config.endpoint(), config.api_key()));
    let input = LocalStorage::new(".");
    let output = LocalStorage::new(config.output_path());

    tracing::debug!("Candidate models: {}", config.models().join(", "));

    let mut engine = ScanEngine::from_config(backend, input, output, config);
    engine.run(images).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse().resolve_env();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting card-scan");

    let images = cli.images.clone();
    let config_path = cli.config.clone();
    let result = match config_path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut config = ScanConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            config.apply_overrides(&cli);
            run(config, &images).await
        }
        None => run(cli, &images).await,
    };

    match result {
        Ok(report) => {
            for failure in &report.failures {
                eprintln!("❌ {}: {}", failure.path, failure.message);
            }
            println!(
                "✅ {} contact(s) from {} of {} image(s), {} tokens used",
                report.summary.contacts,
                report.processed.len(),
                images.len(),
                report.summary.tokens_used
            );
            for output in &report.outputs {
                println!("📁 Output saved to: {}", output);
            }
            if report.processed.is_empty() && !report.failures.is_empty() {
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
