//! 连接配置与运行模式

use crate::{error::InfluxError, InfluxResult};

pub const ENV_URL: &str = "INFLUXDB_URL";
pub const ENV_TOKEN: &str = "INFLUXDB_TOKEN";
pub const ENV_ORG: &str = "INFLUXDB_ORG";
pub const ENV_DATABASE: &str = "INFLUXDB_DATABASE";
pub const ENV_TIMEOUT_MS: &str = "INFLUXDB_TIMEOUT_MS";
pub const ENV_USE_MOCK_DATA: &str = "USE_MOCK_DATA";

pub const DEFAULT_URL: &str = "http://localhost:8181";
pub const DEFAULT_ORG: &str = "myorg";
pub const DEFAULT_DATABASE: &str = "analytics";

/// 连接 InfluxDB 3 Core 所需的参数。加载之后不再修改
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// 服务地址，例如 `http://localhost:8181`
    pub url: String,

    /// 访问令牌
    pub token: String,

    pub org: String,

    /// 数据库名称。InfluxDB 3 使用 database 而不是 bucket
    pub database: String,

    /// 客户端级别的请求超时时间，单位为毫秒。`None` 表示不超时
    pub timeout_ms: Option<u64>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("org", &self.org)
            .field("database", &self.database)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            token: token.into(),
            org: DEFAULT_ORG.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            timeout_ms: None,
        }
    }

    /// Build config from env values. Only `INFLUXDB_TOKEN` is required:
    ///
    /// - `INFLUXDB_URL`: defaults to `http://localhost:8181`
    /// - `INFLUXDB_TOKEN`: the credential token
    /// - `INFLUXDB_ORG`: defaults to `myorg`
    /// - `INFLUXDB_DATABASE`: defaults to `analytics`
    /// - `INFLUXDB_TIMEOUT_MS`: optional request timeout in milliseconds
    pub fn from_env() -> InfluxResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 与 [`ConnectionConfig::from_env`] 相同的解析逻辑，但是从任意的键值查找函数中读取
    pub fn from_lookup<F>(lookup: F) -> InfluxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = match lookup(ENV_TOKEN) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(InfluxError::ConfigurationError(format!("{} environment variable is required", ENV_TOKEN))),
        };

        let timeout_ms = match lookup(ENV_TIMEOUT_MS) {
            Some(s) => Some(
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| InfluxError::ConfigurationError(format!("invalid {}: {}", ENV_TIMEOUT_MS, s)))?,
            ),
            None => None,
        };

        Ok(Self {
            url: lookup(ENV_URL).unwrap_or_else(|| DEFAULT_URL.to_string()),
            token,
            org: lookup(ENV_ORG).unwrap_or_else(|| DEFAULT_ORG.to_string()),
            database: lookup(ENV_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            timeout_ms,
        })
    }

    /// 设置服务地址
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// 设置访问令牌
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// 设置组织名称
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// 设置数据库名称
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// 设置客户端级别的超时时间
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// 运行模式。进程启动时确定，之后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 所有操作都由内存中的模拟数据完成
    Mock,

    /// 所有操作都转发给真实的 InfluxDB 服务
    Live,
}

impl Mode {
    /// 读取 `USE_MOCK_DATA`，未设置时默认为模拟模式
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(ENV_USE_MOCK_DATA).ok().as_deref())
    }

    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            None => Self::Mock,
            Some(s) if s.trim().eq_ignore_ascii_case("true") => Self::Mock,
            Some(_) => Self::Live,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock)
    }
}

#[cfg(test)]
mod test_config {
    use std::collections::HashMap;

    use crate::error::InfluxError;

    use super::{ConnectionConfig, Mode};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let res = ConnectionConfig::from_lookup(lookup_from(&[("INFLUXDB_URL", "http://db:8181")]));
        assert!(matches!(res, Err(InfluxError::ConfigurationError(_))));

        let res = ConnectionConfig::from_lookup(lookup_from(&[("INFLUXDB_TOKEN", "")]));
        assert!(matches!(res, Err(InfluxError::ConfigurationError(_))));
    }

    #[test]
    fn test_defaults() {
        let cfg = ConnectionConfig::from_lookup(lookup_from(&[("INFLUXDB_TOKEN", "apiv3_secret")])).unwrap();

        assert_eq!("http://localhost:8181", cfg.url);
        assert_eq!("apiv3_secret", cfg.token);
        assert_eq!("myorg", cfg.org);
        assert_eq!("analytics", cfg.database);
        assert_eq!(None, cfg.timeout_ms);
    }

    #[test]
    fn test_overrides() {
        let cfg = ConnectionConfig::from_lookup(lookup_from(&[
            ("INFLUXDB_TOKEN", "t"),
            ("INFLUXDB_URL", "https://influx.internal:8181"),
            ("INFLUXDB_ORG", "plant"),
            ("INFLUXDB_DATABASE", "sensors"),
            ("INFLUXDB_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();

        assert_eq!("https://influx.internal:8181", cfg.url);
        assert_eq!("plant", cfg.org);
        assert_eq!("sensors", cfg.database);
        assert_eq!(Some(2500), cfg.timeout_ms);

        let res = ConnectionConfig::from_lookup(lookup_from(&[("INFLUXDB_TOKEN", "t"), ("INFLUXDB_TIMEOUT_MS", "soon")]));
        assert!(matches!(res, Err(InfluxError::ConfigurationError(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let cfg = ConnectionConfig::new("apiv3_very_secret");
        let s = format!("{:?}", cfg);
        assert!(!s.contains("apiv3_very_secret"));
        assert!(s.contains("analytics"));
    }

    #[test]
    fn test_mode_flag() {
        assert_eq!(Mode::Mock, Mode::from_flag(None));
        assert_eq!(Mode::Mock, Mode::from_flag(Some("true")));
        assert_eq!(Mode::Mock, Mode::from_flag(Some("TRUE")));
        assert_eq!(Mode::Live, Mode::from_flag(Some("false")));
        assert_eq!(Mode::Live, Mode::from_flag(Some("1")));
        assert_eq!(Mode::Live, Mode::from_flag(Some("")));
    }
}
