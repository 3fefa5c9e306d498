//! 服务运行时

use config::AppConfig;
use errors::{AppError, AppResult};
use telemetry::{init_tracing, init_tracing_json};
use tracing::{error, info};

/// 服务运行时配置
pub struct RuntimeConfig {
    pub config_dir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: "config".to_string(),
        }
    }
}

/// 初始化服务运行时
pub fn init_runtime(config: &AppConfig) {
    // 生产环境或显式开启时输出 JSON
    if config.telemetry.json || config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );
}

/// 等待关闭信号
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// 按运行时配置加载应用配置
pub fn load_config(runtime: &RuntimeConfig) -> AppResult<AppConfig> {
    AppConfig::load(&runtime.config_dir).map_err(|e| AppError::configuration(e.to_string()))
}
