//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BLOGGEN__*` 覆盖（双下划线表示嵌套，如 `BLOGGEN__WEB__PORT=8080`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub web: WebSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub unsplash: UnsplashSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            web: WebSection::default(),
            llm: LlmSection::default(),
            pipeline: PipelineSection::default(),
            unsplash: UnsplashSection::default(),
        }
    }
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [web] 段：监听地址与端口
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    /// 后端：openai 兼容端点（含 DeepSeek、自建代理），由 base_url 决定
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// API Key 所在环境变量名，缺省读 OPENAI_API_KEY
    pub api_key_env: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// [pipeline] 段：进度事件节流
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// 相邻 status/log 事件的最小间隔（毫秒），终态事件不受限
    #[serde(default = "default_min_event_interval_ms")]
    pub min_event_interval_ms: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            min_event_interval_ms: default_min_event_interval_ms(),
        }
    }
}

fn default_min_event_interval_ms() -> u64 {
    100
}

/// [unsplash] 段：图片搜索超时与凭据来源
#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashSection {
    /// Access Key 所在环境变量名；变量缺失时工具回退到占位图片
    #[serde(default = "default_access_key_env")]
    pub access_key_env: String,
    #[serde(default = "default_unsplash_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UnsplashSection {
    fn default() -> Self {
        Self {
            access_key_env: default_access_key_env(),
            timeout_secs: default_unsplash_timeout_secs(),
        }
    }
}

fn default_access_key_env() -> String {
    "UNSPLASH_ACCESS_KEY".to_string()
}

fn default_unsplash_timeout_secs() -> u64 {
    10
}

/// 从 config 目录加载配置，环境变量 BLOGGEN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 BLOGGEN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BLOGGEN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.web.port, 5000);
        assert_eq!(cfg.pipeline.min_event_interval_ms, 100);
        assert_eq!(cfg.unsplash.access_key_env, "UNSPLASH_ACCESS_KEY");
    }
}
