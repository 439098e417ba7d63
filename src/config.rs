use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 请求体大小上限（字节），对全部路由生效
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 路由前缀
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
        }
    }
}

/// ping 端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    /// `GET /api/ping` 返回的消息文本。
    ///
    /// 可通过环境变量 `APP_PING_MESSAGE` 覆盖，未设置时默认为 `"ping"`。
    pub message: String,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            message: "ping".to_string(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 是否启用 CORS
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    pub allowed_headers: Vec<String>,
    /// 暴露的响应头列表（支持 "*" 表示任意）
    pub expose_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// 能力装配配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// 单个能力初始化的超时时间（秒）。
    ///
    /// 超时后该能力按不可用处理并中止初始化任务，不会阻塞基线服务启动。
    pub load_timeout_secs: u64,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            load_timeout_secs: 10,
        }
    }
}

impl CapabilitiesConfig {
    /// 获取能力初始化超时时间
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs.max(1))
    }
}

/// 表单提交能力配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// 是否启用表单提交能力
    pub enabled: bool,
    /// 提交记录转发地址（可选）。未配置时仅记录日志。
    pub forward_url: Option<String>,
    /// 后台转发队列的容量，队列满时请求返回 503
    pub queue_capacity: usize,
    /// 单次转发请求的超时时间（秒）
    pub forward_timeout_secs: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forward_url: None,
            queue_capacity: 256,
            forward_timeout_secs: 10,
        }
    }
}

/// 管理代理能力配置
///
/// 指向外部内容平台。`platform_url` 或 `api_key` 缺失时，
/// 该能力在启动时按不可用处理，基线服务不受影响。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 是否启用管理代理能力
    pub enabled: bool,
    /// 外部内容平台 Base URL
    pub platform_url: Option<String>,
    /// 外部内容平台 API Key（Bearer）
    pub api_key: Option<String>,
    /// 上游请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            platform_url: None,
            api_key: None,
            timeout_secs: 15,
        }
    }
}

/// 前端静态资源配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// 构建产物目录（可选）。配置后由本进程直接托管站点静态文件。
    pub dist_dir: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    /// ping 端点配置
    pub ping: PingConfig,
    /// CORS 配置
    pub cors: CorsConfig,
    /// 能力装配配置
    pub capabilities: CapabilitiesConfig,
    /// 表单提交能力配置
    pub forms: FormsConfig,
    /// 管理代理能力配置
    pub admin: AdminConfig,
    /// 前端静态资源配置
    pub frontend: FrontendConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    ///
    /// 配置文件允许缺失：全部配置节均有默认值。可选能力缺少配置时
    /// 只影响对应能力的可用性，不会导致启动失败。
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        let builder = ConfigBuilder::builder()
            // 加载配置文件（允许缺失）
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP_PING_MESSAGE
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
