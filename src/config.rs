use config::builder::DefaultState;
use crate::error::Result;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// 可选配置文件 (不存在时忽略)
pub const CONFIG_FILE: &str = "invoice-audit";

/// 默认请求体上限 32 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求体上限 (base64 上传后约为原文件的 4/3)
    pub max_upload_bytes: usize,
}

/// 抽取/审核后端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: 60,
            },
        }
    }
}

impl AppConfig {
    /// 默认值 < invoice-audit.toml < AUDIT_* 环境变量 (如 AUDIT_SERVER__PORT)
    pub fn load() -> Result<Self> {
        Self::build(Config::builder().add_source(File::with_name(CONFIG_FILE).required(false)))
    }

    /// 从 TOML 文本加载，同样叠加环境变量
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from_str(content, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let defaults = Self::default();
        builder
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.max_upload_bytes", defaults.server.max_upload_bytes as i64)?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs as i64)?
            .add_source(Environment::with_prefix("AUDIT").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }
}
