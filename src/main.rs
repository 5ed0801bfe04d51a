use clap::Parser;
use deprompt::config::cli::Command;
use deprompt::core::retry::{RetryPolicy, Retrying};
use deprompt::domain::ports::Improve;
use deprompt::utils::error::{DepromptError, ErrorSeverity};
use deprompt::utils::{logger, validation::Validate};
use deprompt::{openai_improver, AppState, CliConfig, ImprovementRequest, ServiceConfig};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在時忽略
    dotenv::dotenv().ok();

    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting deprompt");

    let config = ServiceConfig::from_env();
    if cli.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    // 沒有 API key 就無法服務任何請求，啟動時直接失敗
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    let improver = match openai_improver(config) {
        Ok(improver) => improver,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };

    match cli.command {
        Command::Serve { host, port } => {
            let addr = CliConfig::bind_addr(&host, port);
            let listener = TcpListener::bind(&addr).await?;
            deprompt::adapters::http::serve(listener, AppState::new(improver)).await?;
        }
        Command::Improve {
            prompt,
            target_model,
            context,
            json,
        } => {
            let request =
                ImprovementRequest::new(prompt, target_model.as_deref()).with_context(context);
            let retrying = Retrying::new(
                improver,
                RetryPolicy::exponential(2, Duration::from_secs(1), Duration::from_secs(8), 2.0),
            );

            match retrying.improve(&request).await {
                Ok(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
                Ok(result) => {
                    println!("[Improved Prompt]\n{}\n", result.improved_prompt);
                    println!("[Explanation of Changes]\n{}", result.explanation);
                    if let Some(considerations) = &result.considerations {
                        println!("\n[Additional Considerations]\n{}", considerations);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Improvement failed: {} (Category: {:?}, Severity: {:?})",
                        e,
                        e.category(),
                        e.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    eprintln!("❌ {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                    std::process::exit(exit_code(&e));
                }
            }
        }
    }

    Ok(())
}

/// 依錯誤嚴重程度決定退出碼
fn exit_code(error: &DepromptError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 1,      // 輸入錯誤
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 上游處理錯誤
        ErrorSeverity::Critical => 3, // 設定或系統錯誤
    }
}
