use std::{collections::BTreeMap, collections::HashMap, fmt::Display, time::Duration};

use bytes::Bytes;
use reqwest::Response;
use url::Url;

use data::{QueryOperation, QueryRequest, WriteOperation, WriteRequest};
use database::CreateDatabaseOperation;
use error::InfluxError;

pub mod access;
pub mod config;
pub mod data;
pub mod database;
pub mod error;
pub mod handle;
pub mod macros;
pub mod mock;
pub mod model;

#[cfg(test)]
pub(crate) mod test_util;

pub use access::{Backend, TimeseriesAccess};
pub use config::{ConnectionConfig, Mode};
pub use handle::ClientHandle;
pub use mock::MockStore;
pub use model::{FieldValue, Point, QueryRow};

const USER_AGENT: &str = concat!("influxdb-access-rs/", env!("CARGO_PKG_VERSION"));
const HEADER_AUTHORIZATION: &str = "Authorization";
const HEADER_CONTENT_TYPE: &str = "Content-Type";
const HEADER_ACCEPT: &str = "Accept";

pub type InfluxResult<T> = Result<T, InfluxError>;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfluxOp {
    #[default]
    Undefined,
    WriteLp,
    QuerySql,
    QueryInfluxQl,
    CreateDatabase,
}

impl InfluxOp {
    /// 操作对应的 HTTP API 路径
    pub fn path(&self) -> &'static str {
        match self {
            Self::Undefined => "",
            Self::WriteLp => "api/v3/write_lp",
            Self::QuerySql => "api/v3/query_sql",
            Self::QueryInfluxQl => "api/v3/query_influxql",
            Self::CreateDatabase => "api/v3/configure/database",
        }
    }
}

impl Display for InfluxOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// The request to send to InfluxDB 3 HTTP API
#[derive(Debug, Clone)]
pub struct InfluxRequest {
    method: reqwest::Method,
    operation: InfluxOp,
    headers: HashMap<String, String>,
    query: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Default for InfluxRequest {
    fn default() -> Self {
        Self {
            method: reqwest::Method::POST,
            operation: InfluxOp::Undefined,
            headers: HashMap::new(),
            query: BTreeMap::new(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfluxClientOptions {
    pub timeout_ms: Option<u64>,
}

/// InfluxDB 3 Core client
#[derive(Clone)]
pub struct InfluxClient {
    token: String,
    org: String,
    database: String,
    endpoint: String,
    http_client: reqwest::Client,
    options: InfluxClientOptions,
}

impl std::fmt::Debug for InfluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxClient")
            .field("org", &self.org)
            .field("database", &self.database)
            .field("endpoint", &self.endpoint)
            .field("http_client", &self.http_client)
            .field("options", &self.options)
            .finish()
    }
}

impl InfluxClient {
    /// 根据配置构造客户端。这里不会发起任何网络请求，连接在第一次调用时才建立
    pub fn from_config(config: &ConnectionConfig) -> InfluxResult<Self> {
        let url = Url::parse(&config.url).map_err(|e| InfluxError::ClientInitError(format!("invalid endpoint {}: {}", config.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(InfluxError::ClientInitError(format!("unsupported endpoint scheme: {}", url.scheme())));
        }

        // 超时只在 `send` 中按请求设置，这样单个操作可以覆盖或取消它
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build().map_err(|e| InfluxError::ClientInitError(e.to_string()))?;

        Ok(Self {
            token: config.token.clone(),
            org: config.org.clone(),
            database: config.database.clone(),
            endpoint: config.url.trim_end_matches('/').to_string(),
            http_client,
            options: InfluxClientOptions { timeout_ms: config.timeout_ms },
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn prepare_headers(&self, req: &mut InfluxRequest) {
        let headers = &mut req.headers;
        headers.insert(HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", self.token));
        headers.entry(HEADER_ACCEPT.to_string()).or_insert_with(|| "application/json".to_string());
    }

    pub async fn send(&self, req: InfluxRequest) -> InfluxResult<Response> {
        let mut req = req;
        self.prepare_headers(&mut req);

        let InfluxRequest {
            method,
            operation,
            headers,
            query,
            body,
        } = req;

        let mut url = Url::parse(format!("{}/{}", self.endpoint, operation).as_str())?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        log::debug!("{} {}", method, url);

        let mut request_builder = self.http_client.request(method, url).body(Bytes::from_owner(body));

        for (k, v) in &headers {
            log::debug!(">> header: {}", k);
            request_builder = request_builder.header(k.as_str(), v.as_str());
        }

        // 客户端配置的超时，或者被单个操作覆盖后的值
        if let Some(ms) = self.options.timeout_ms {
            request_builder = request_builder.timeout(Duration::from_millis(ms));
        }

        let response = request_builder.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = match response.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Err(_) => "".to_string(),
        };

        let e = InfluxError::StatusError(status, message);
        log::error!("api call failed for operation {}: {}", operation, e);

        Err(e)
    }

    /// 写入数据点，使用 line protocol 编码
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let response = client
    ///     .write(
    ///         WriteRequest::new("analytics").point(
    ///             Point::new("iot_sensors")
    ///                 .tag("sensor_id", "sensor_001")
    ///                 .field_double("temperature", 22.5),
    ///         ),
    ///     )
    ///     .send()
    ///     .await;
    /// ```
    pub fn write(&self, request: WriteRequest) -> WriteOperation {
        WriteOperation::new(self.clone(), request)
    }

    /// 执行查询。查询语言通过 [`QueryRequest::language`] 显式指定
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let rows = client
    ///     .query(QueryRequest::new("analytics", "SELECT * FROM iot_sensors ORDER BY time DESC LIMIT 5"))
    ///     .send()
    ///     .await?;
    /// ```
    pub fn query(&self, request: QueryRequest) -> QueryOperation {
        QueryOperation::new(self.clone(), request)
    }

    /// 创建数据库。数据库已经存在时视为成功
    pub fn create_database(&self, database: &str) -> CreateDatabaseOperation {
        CreateDatabaseOperation::new(self.clone(), database)
    }

    /// 释放底层的连接池
    pub fn close(self) {
        log::info!("InfluxDB connection to {} closed", self.endpoint);
    }
}
