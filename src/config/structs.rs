use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、代理信任
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - links: 短链生成与重定向策略（显式传入各 service）
/// - dedup: 去重缓存容量与清理周期
/// - auth: Bearer JWT 校验
/// - cors: 跨域来源
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub links: LinkSettings,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LP，分隔符：__
    /// 示例：LP__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 信任 X-Forwarded-For / X-Real-IP（部署在反向代理之后时开启）
    #[serde(default)]
    pub trust_proxy: bool,
}

/// 数据库连接配置
///
/// `database_url = "memory"` 使用进程内存储（重启即丢失）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 连接/获取连接超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Short link policy shared by link creation and the redirect path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Public prefix of every short link, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_dedup_window_seconds")]
    pub dedup_window_seconds: u64,
    /// Number of hex characters in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

impl LinkSettings {
    /// Full short link for a code: `{base_url}/{code}`
    pub fn short_link_for(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// 超出 chrono 可表示范围时按无限长窗口处理
    pub fn dedup_window(&self) -> chrono::Duration {
        i64::try_from(self.dedup_window_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// 短码格式校验（固定长度的小写十六进制）
    pub fn is_valid_code(&self, code: &str) -> bool {
        code.len() == self.code_length
            && code
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

/// 去重缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_dedup_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_dedup_sweep_interval")]
    pub sweep_interval_secs: u64,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret; empty means a random one is generated at startup
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 允许的来源；为空时只允许同源，`["*"]` 允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    9000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://linkpulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_base_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_dedup_window_seconds() -> u64 {
    7
}

fn default_code_length() -> usize {
    8
}

fn default_max_generation_attempts() -> u32 {
    10
}

fn default_dedup_max_entries() -> usize {
    100_000
}

fn default_dedup_sweep_interval() -> u64 {
    60
}

fn default_token_ttl_minutes() -> u64 {
    60 * 24
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trust_proxy: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dedup_window_seconds: default_dedup_window_seconds(),
            code_length: default_code_length(),
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            max_entries: default_dedup_max_entries(),
            sweep_interval_secs: default_dedup_sweep_interval(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_for_trims_trailing_slash() {
        let settings = LinkSettings {
            base_url: "https://lp.example/".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.short_link_for("0a1b2c3d"), "https://lp.example/0a1b2c3d");
    }

    #[test]
    fn test_is_valid_code() {
        let settings = LinkSettings::default();
        assert!(settings.is_valid_code("0a1b2c3d"));
        assert!(!settings.is_valid_code("0A1B2C3D"));
        assert!(!settings.is_valid_code("0a1b2c3"));
        assert!(!settings.is_valid_code("links"));
        assert!(!settings.is_valid_code("0a1b2c3g"));
    }

    #[test]
    fn test_sample_config_roundtrips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.links.code_length, 8);
        assert_eq!(parsed.links.dedup_window_seconds, 7);
        assert_eq!(parsed.server.port, 9000);
    }

    #[test]
    fn test_dedup_window_out_of_range_does_not_panic() {
        let settings = LinkSettings {
            dedup_window_seconds: 10_000_000_000_000_000,
            ..Default::default()
        };
        assert_eq!(settings.dedup_window(), chrono::Duration::MAX);

        let settings = LinkSettings::default();
        assert_eq!(settings.dedup_window(), chrono::Duration::seconds(7));
    }
}
