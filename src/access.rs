//! 统一的时序数据访问层
//!
//! 运行模式在构造时确定一次：模拟模式下所有操作由 [`MockStore`] 完成，
//! live 模式下转发给 InfluxDB。两种模式互不回退，live 模式出错时不会返回模拟数据。

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::{
    config::{ConnectionConfig, Mode},
    data::{QueryLanguage, QueryRequest, WriteRequest},
    error::InfluxError,
    handle::ClientHandle,
    mock::{MockStore, DEFAULT_MOCK_ROWS, MOCK_SERIES},
    model::{rules, FieldValue, Point, QueryRow},
    InfluxResult,
};

/// 连通性测试使用的最小查询
pub const PING_QUERY: &str = "SELECT 1";

/// 两种后端实现同样的一组操作
#[derive(Debug)]
pub enum Backend {
    Mock(MockStore),
    Live(ClientHandle),
}

impl Backend {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Mock(_) => Mode::Mock,
            Self::Live(_) => Mode::Live,
        }
    }

    async fn write_points(&self, points: Vec<Point>) -> InfluxResult<()> {
        match self {
            Self::Mock(store) => {
                for p in points {
                    store.append(p);
                }
                Ok(())
            }

            Self::Live(handle) => {
                let client = handle.get()?;
                let request = WriteRequest::new(client.database()).points(points);

                client.write(request).send().await.map_err(|e| {
                    log::error!("Error writing to InfluxDB: {}", e);
                    e.into_write_error()
                })
            }
        }
    }

    async fn query(&self, text: &str, language: QueryLanguage) -> InfluxResult<Vec<QueryRow>> {
        match self {
            // 模拟模式忽略查询语句和已写入的数据，总是返回新生成的数据
            Self::Mock(store) => Ok(store.generate(MOCK_SERIES, DEFAULT_MOCK_ROWS)),

            Self::Live(handle) => {
                let client = handle.get()?;
                let request = QueryRequest::new(client.database(), text).language(language);

                client.query(request).send().await.map_err(|e| {
                    log::error!("Error querying InfluxDB: {}", e);
                    e.into_query_error()
                })
            }
        }
    }

    async fn test_connection(&self) -> bool {
        let handle = match self {
            Self::Mock(_) => return true,
            Self::Live(handle) => handle,
        };

        let client = match handle.get() {
            Ok(c) => c,
            Err(e) => {
                log::error!("Connection test failed: {}", e);
                return false;
            }
        };

        match client.query(QueryRequest::new(client.database(), PING_QUERY)).send().await {
            Ok(_) => true,
            Err(e) => {
                log::error!("Connection test failed: {}", e);
                false
            }
        }
    }

    async fn create_database(&self) -> InfluxResult<()> {
        match self {
            Self::Mock(_) => Ok(()),

            Self::Live(handle) => {
                let client = handle.get()?;
                client
                    .create_database(client.database())
                    .send()
                    .await
                    .map_err(InfluxError::into_database_error)
            }
        }
    }

    fn close(&self) {
        match self {
            Self::Mock(store) => log::info!("Mock store discarded with {} point(s)", store.len()),
            Self::Live(handle) => handle.close(),
        }
    }
}

/// 访问层。由调用方构造并持有，调用方负责在退出前调用 [`TimeseriesAccess::close`]
///
/// # Examples
///
/// ```ignore
/// let access = TimeseriesAccess::from_env()?;
///
/// access
///     .write("iot_sensors", [("sensor_id", "sensor_001")], [("temperature", 22.5)], None)
///     .await?;
///
/// let rows = access.query("SELECT * FROM iot_sensors ORDER BY time DESC LIMIT 5").await?;
/// access.close();
/// ```
#[derive(Debug)]
pub struct TimeseriesAccess {
    backend: Backend,
    closed: AtomicBool,
}

impl TimeseriesAccess {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            closed: AtomicBool::new(false),
        }
    }

    /// 模拟模式，不需要任何配置
    pub fn mock() -> Self {
        log::info!("Using mock data mode");
        Self::new(Backend::Mock(MockStore::new()))
    }

    /// live 模式。客户端在第一次操作时才构造
    pub fn live(config: ConnectionConfig) -> Self {
        log::info!("Using InfluxDB at {} (database: {})", config.url, config.database);
        Self::new(Backend::Live(ClientHandle::new(config)))
    }

    /// 根据 `USE_MOCK_DATA` 选择模式。live 模式下缺少令牌时返回 `ConfigurationError`
    pub fn from_env() -> InfluxResult<Self> {
        match Mode::from_env() {
            Mode::Mock => Ok(Self::mock()),
            Mode::Live => Ok(Self::live(ConnectionConfig::from_env()?)),
        }
    }

    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// 模拟模式下返回内存存储
    pub fn mock_store(&self) -> Option<&MockStore> {
        match &self.backend {
            Backend::Mock(store) => Some(store),
            Backend::Live(_) => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> InfluxResult<()> {
        if self.is_closed() {
            return Err(InfluxError::Closed);
        }
        Ok(())
    }

    /// 写入一个数据点。`timestamp` 为 `None` 时使用当前时间
    pub async fn write<K, V, F, X>(
        &self,
        measurement: &str,
        tags: impl IntoIterator<Item = (K, V)>,
        fields: impl IntoIterator<Item = (F, X)>,
        timestamp: Option<DateTime<Utc>>,
    ) -> InfluxResult<()>
    where
        K: Into<String>,
        V: Into<String>,
        F: Into<String>,
        X: Into<FieldValue>,
    {
        let mut point = Point::new(measurement).tags(tags).fields(fields);
        point.timestamp = timestamp;

        self.write_point(point).await
    }

    pub async fn write_point(&self, point: Point) -> InfluxResult<()> {
        self.write_points(vec![point]).await
    }

    /// 批量写入。live 模式下所有数据点在同一个请求中提交，要么全部成功要么全部失败
    pub async fn write_points(&self, points: Vec<Point>) -> InfluxResult<()> {
        self.ensure_open()?;

        if points.is_empty() {
            return Err(InfluxError::ValidationFailed("can not write empty points".to_string()));
        }

        if points.len() > rules::MAX_POINT_COUNT {
            return Err(InfluxError::ValidationFailed(format!(
                "too many points in one write: {}, max {}",
                points.len(),
                rules::MAX_POINT_COUNT
            )));
        }

        for p in &points {
            p.validate()?;
        }

        let count = points.len();
        self.backend.write_points(points).await?;
        log::debug!("wrote {} point(s) in {:?} mode", count, self.mode());

        Ok(())
    }

    /// 使用 SQL 查询
    pub async fn query(&self, query_text: &str) -> InfluxResult<Vec<QueryRow>> {
        self.query_with_language(query_text, QueryLanguage::Sql).await
    }

    pub async fn query_with_language(&self, query_text: &str, language: QueryLanguage) -> InfluxResult<Vec<QueryRow>> {
        self.ensure_open()?;
        self.backend.query(query_text, language).await
    }

    /// 只回答能不能连通，任何错误都记录日志并返回 `false`
    pub async fn test_connection(&self) -> bool {
        if self.is_closed() {
            log::error!("Connection test failed: {}", InfluxError::Closed);
            return false;
        }

        self.backend.test_connection().await
    }

    /// 创建配置中的数据库。已经存在时视为成功，模拟模式下什么也不做
    pub async fn create_database(&self) -> InfluxResult<()> {
        self.ensure_open()?;
        self.backend.create_database().await
    }

    /// 幂等。不会等待正在进行中的操作，它们持有自己的客户端副本并继续完成
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.backend.close();
    }
}
