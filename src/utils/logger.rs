use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "deprompt=info";
const VERBOSE_DIRECTIVES: &str = "deprompt=debug,info";

/// `RUST_LOG` 優先，未設定時使用預設過濾規則
fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

pub fn init_cli_logger(verbose: bool) {
    let directives = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    };

    tracing_subscriber::registry()
        .with(env_filter(directives))
        .with(fmt::layer().with_target(false).compact())
        .init();
}

pub fn init_lambda_logger() {
    // CloudWatch 自帶時間戳
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_DIRECTIVES))
        .with(fmt::layer().with_target(false).without_time().json())
        .init();
}
