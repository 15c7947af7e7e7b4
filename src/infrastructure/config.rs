//! 配置基础设施
//!
//! 配置来源按优先级从低到高：默认值 → TOML 配置文件（`APP_CONFIG` 指定）→ 环境变量。
//! 工作目录下存在 `.env` 时会先被载入环境。

use serde::{Deserialize, Serialize};
use sqlx::{mysql::MySqlConnectOptions, sqlite::SqliteConnectOptions};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// 服务配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库连接配置
    pub database: DatabaseConfig,
    /// 连接池配置
    pub pool: PoolConfig,
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 完整连接串（`mysql://...` 或 `sqlite:...`），设置后忽略下面的分项
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// 启动时执行 `CREATE TABLE IF NOT EXISTS products`
    pub init_schema: bool,
}

/// 连接池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: Option<u64>,
    pub max_lifetime_secs: Option<u64>,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: 3306,
            user: None,
            password: None,
            database: None,
            init_schema: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 8,
            idle_timeout_secs: Some(600),
            max_lifetime_secs: Some(1800),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 解析后的数据库目标
#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    MySql(MySqlConnectOptions),
    Sqlite(SqliteConnectOptions),
}

impl DatabaseTarget {
    /// 用于日志的后端名称，不含凭据
    pub fn backend(&self) -> &'static str {
        match self {
            DatabaseTarget::MySql(_) => "mysql",
            DatabaseTarget::Sqlite(_) => "sqlite",
        }
    }
}

impl DatabaseConfig {
    /// 将配置解析为可连接的目标
    ///
    /// `url` 优先；否则由 host/user/password/database 组装 MySQL 连接参数。
    pub fn target(&self) -> Result<DatabaseTarget, ConfigError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return parse_database_url(url);
        }

        let host = self
            .host
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("MYSQL_HOST".to_string()))?;
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("MYSQL_USER".to_string()))?;
        let database = self
            .database
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("MYSQL_DATABASE".to_string()))?;

        let mut options = MySqlConnectOptions::new()
            .host(host)
            .port(self.port)
            .username(user)
            .database(database);
        if let Some(password) = self.password.as_deref() {
            options = options.password(password);
        }

        Ok(DatabaseTarget::MySql(options))
    }
}

fn parse_database_url(url: &str) -> Result<DatabaseTarget, ConfigError> {
    if url.starts_with("mysql:") {
        let options = MySqlConnectOptions::from_str(url)
            .map_err(|e| ConfigError::Invalid(format!("DATABASE_URL: {}", e)))?;
        Ok(DatabaseTarget::MySql(options))
    } else if url.starts_with("sqlite:") {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| ConfigError::Invalid(format!("DATABASE_URL: {}", e)))?
            .create_if_missing(true);
        Ok(DatabaseTarget::Sqlite(options))
    } else {
        Err(ConfigError::Invalid(format!(
            "DATABASE_URL 仅支持 mysql:// 或 sqlite: 前缀，实际为: {}",
            url.split(':').next().unwrap_or_default()
        )))
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime_secs.map(Duration::from_secs)
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "监听地址 {}:{} 无效: {}",
                    self.bind_address, self.port, e
                ))
            })
    }
}

impl AppConfig {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 加载完整配置：`.env` → 配置文件或默认值 → 环境变量覆盖 → 校验
    pub fn load() -> Result<Self, ConfigError> {
        // .env 不存在时忽略
        let _ = dotenv::dotenv();

        let mut config = match std::env::var("APP_CONFIG") {
            Ok(path) => {
                info!("从配置文件加载: {}", path);
                Self::load_from_file(&path)?
            }
            Err(_) => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 使用进程环境变量覆盖配置
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// 使用给定的查找函数覆盖配置，便于测试时替换环境
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = lookup("MYSQL_HOST") {
            self.database.host = Some(host);
        }
        if let Some(port) = lookup("MYSQL_PORT") {
            self.database.port = parse_var("MYSQL_PORT", &port)?;
        }
        if let Some(user) = lookup("MYSQL_USER") {
            self.database.user = Some(user);
        }
        if let Some(password) = lookup("MYSQL_PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(database) = lookup("MYSQL_DATABASE") {
            self.database.database = Some(database);
        }
        if let Some(flag) = lookup("DB_INIT_SCHEMA") {
            self.database.init_schema = parse_var("DB_INIT_SCHEMA", &flag)?;
        }
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            self.pool.max_connections = parse_var("DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(bind) = lookup("HTTP_BIND") {
            self.http.bind_address = bind;
        }
        if let Some(port) = lookup("HTTP_PORT") {
            self.http.port = parse_var("HTTP_PORT", &port)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.max_connections == 0 {
            return Err(ConfigError::Invalid("连接池最大连接数必须大于0".to_string()));
        }
        if self.pool.min_connections > self.pool.max_connections {
            return Err(ConfigError::Invalid(format!(
                "连接池最小连接数 {} 大于最大连接数 {}",
                self.pool.min_connections, self.pool.max_connections
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        self.http.socket_addr()?;
        self.database.target()?;
        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}={}: {}", key, raw, e)))
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("缺少必需的配置项: {0}")]
    Missing(String),
    #[error("配置无效: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.pool.max_connections, 10);
        assert_eq!(config.logging.level, "info");
        assert!(!config.database.init_schema);
    }

    #[test]
    fn test_mysql_target_from_env() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env_of(&[
                ("MYSQL_HOST", "db.internal"),
                ("MYSQL_USER", "shop"),
                ("MYSQL_PASSWORD", "secret"),
                ("MYSQL_DATABASE", "inventory"),
            ]))
            .unwrap();

        let target = config.database.target().unwrap();
        assert_eq!(target.backend(), "mysql");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_host_is_reported() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env_of(&[("MYSQL_USER", "shop"), ("MYSQL_DATABASE", "inventory")]))
            .unwrap();

        match config.database.target() {
            Err(ConfigError::Missing(var)) => assert_eq!(var, "MYSQL_HOST"),
            other => panic!("expected missing MYSQL_HOST, got {:?}", other),
        }
    }

    #[test]
    fn test_database_url_wins_over_parts() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(env_of(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("MYSQL_HOST", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.database.target().unwrap().backend(), "sqlite");
    }

    #[test]
    fn test_unsupported_url_scheme() {
        let config = AppConfig {
            database: DatabaseConfig {
                url: Some("postgres://localhost/shop".to_string()),
                ..DatabaseConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(matches!(
            config.database.target(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_port_is_invalid() {
        let mut config = AppConfig::default();
        let result = config.apply_env_from(env_of(&[("HTTP_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.database.url = Some("sqlite::memory:".to_string());
        assert!(config.validate().is_ok());

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        config.pool.min_connections = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "sqlite::memory:"
init_schema = true

[http]
port = 8081
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert!(config.database.init_schema);
        assert_eq!(config.http.port, 8081);
        assert_eq!(config.http.bind_address, "0.0.0.0");
        assert_eq!(config.pool.acquire_timeout_secs, 8);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load_from_file("/nonexistent/products.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
