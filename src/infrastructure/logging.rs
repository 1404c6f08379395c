//! 日志系统配置模块
//! 支持结构化日志（JSON）与文本日志，级别可由 RUST_LOG 覆盖

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// 初始化日志系统
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(config);

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(true))
            .try_init()?;
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// 简化初始化（使用默认配置）
pub fn init_default_logging() {
    let config = LoggingConfig::default();
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logging: {}", e);
    });
}
