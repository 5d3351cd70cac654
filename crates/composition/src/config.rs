//! 部署配置
//!
//! 服务端启动参数: 参与装配的包前缀与日志选项。
//! 配置以 TOML 承载，也可以完全由代码构造。

use serde::{Deserialize, Serialize};
use tracing::info;
use viewbind_common::{GlueError, GlueResult};

/// 部署配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// 参与装配的包前缀，空列表表示不过滤
    #[serde(default)]
    pub packages_to_scan: Vec<String>,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeploymentConfig {
    /// 从 TOML 文本解析配置
    pub fn from_toml_str(text: &str) -> GlueResult<Self> {
        toml::from_str(text).map_err(|e| GlueError::BootstrapFailed {
            message: format!("部署配置解析失败: {e}"),
        })
    }

    /// 从文件加载配置
    pub fn from_file(path: &std::path::Path) -> GlueResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GlueError::BootstrapFailed {
            message: format!("部署配置读取失败: {}: {e}", path.display()),
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "部署配置已加载");
        Ok(config)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别，支持 EnvFilter 指令语法
    pub level: String,
    /// 是否输出 JSON 格式
    pub json: bool,
}

impl LoggingConfig {
    /// 开发环境预设: debug 级别，人类可读输出
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }

    /// 生产环境预设: info 级别，JSON 输出
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// 初始化全局日志订阅器
///
/// 重复初始化时保留先注册的订阅器并静默返回
pub fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_ok() {
        info!(level = %config.level, json = config.json, "日志系统已初始化");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = DeploymentConfig::from_toml_str(
            r#"
            packages_to_scan = ["shop::ui", "shop::views"]

            [logging]
            level = "info"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.packages_to_scan, vec!["shop::ui", "shop::views"]);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
    }

    #[test]
    fn defaults_apply_for_missing_sections() {
        let config = DeploymentConfig::from_toml_str("").unwrap();
        assert!(config.packages_to_scan.is_empty());
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = DeploymentConfig {
            packages_to_scan: vec!["shop".to_string()],
            logging: LoggingConfig::production(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DeploymentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.packages_to_scan, config.packages_to_scan);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(matches!(
            DeploymentConfig::from_toml_str("packages_to_scan = 3"),
            Err(GlueError::BootstrapFailed { .. })
        ));
    }
}
