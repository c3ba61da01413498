use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{self, AppError};

/// 初始化日志，级别取 RUST_LOG，默认 info
pub fn init_logger(cfg: &app::app_config::AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match cfg.logger.default.as_str() {
        "console" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        other => {
            anyhow::bail!("Invalid log type {}", other)
        }
    }
    Ok(())
}

pub fn error(err: &AppError) {
    let backtrace = format!("{}", err.backtrace());
    tracing::error!(
        code = err.code(),
        backtrace = backtrace.as_str(),
        message = err.message()
    );
}

/// 用户输入错误只记录错误码和信息
pub fn warn(err: &AppError) {
    tracing::warn!(code = err.code(), message = err.message());
}
