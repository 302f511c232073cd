use std::collections::BTreeMap;

use crate::{
    add_per_request_options,
    error::InfluxError,
    model::{rules, Point},
    InfluxClient, InfluxOp, InfluxRequest, InfluxResult, HEADER_CONTENT_TYPE,
};

/// 写入数据点。使用 line protocol 编码，时间戳精度为纳秒
///
/// 官方文档：<https://docs.influxdata.com/influxdb3/core/write-data/http-api/v3-write-lp/>
#[derive(Debug, Default, Clone)]
pub struct WriteRequest {
    /// 数据库名称
    pub database: String,

    /// 要写入的数据点
    pub points: Vec<Point>,

    /// 是否允许部分写入成功。默认为 `false`，任何一行解析失败则整批拒绝
    pub accept_partial: bool,
}

impl WriteRequest {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            ..Default::default()
        }
    }

    /// 设置数据库名称
    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();

        self
    }

    /// 添加一个数据点
    pub fn point(mut self, point: Point) -> Self {
        self.points.push(point);

        self
    }

    /// 设置所有的数据点
    pub fn points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points = points.into_iter().collect();

        self
    }

    /// 设置是否允许部分写入
    pub fn accept_partial(mut self, accept_partial: bool) -> Self {
        self.accept_partial = accept_partial;

        self
    }

    pub(crate) fn validate(&self) -> InfluxResult<()> {
        if !rules::validate_database_name(&self.database) {
            return Err(InfluxError::ValidationFailed(format!("invalid database name: {}", self.database)));
        }

        if self.points.is_empty() {
            return Err(InfluxError::ValidationFailed("can not write empty points".to_string()));
        }

        if self.points.len() > rules::MAX_POINT_COUNT {
            return Err(InfluxError::ValidationFailed(format!(
                "points count exceeds max points count allowed: {}",
                rules::MAX_POINT_COUNT
            )));
        }

        for p in &self.points {
            p.validate()?;
        }

        Ok(())
    }

    /// 把所有数据点编码成 line protocol 文本，每行一个数据点
    pub(crate) fn encode_body(&self) -> InfluxResult<String> {
        let lines = self.points.iter().map(Point::to_line_protocol).collect::<InfluxResult<Vec<_>>>()?;

        Ok(lines.join("\n"))
    }
}

#[derive(Debug, Clone)]
pub struct WriteOperation {
    client: InfluxClient,
    request: WriteRequest,
}

add_per_request_options!(WriteOperation);

impl WriteOperation {
    pub(crate) fn new(client: InfluxClient, request: WriteRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        let body = request.encode_body()?;
        log::debug!("line protocol body:\n{}", body);

        let mut query = BTreeMap::new();
        query.insert("db".to_string(), request.database.clone());
        query.insert("precision".to_string(), "nanosecond".to_string());
        query.insert("accept_partial".to_string(), request.accept_partial.to_string());

        let mut req = InfluxRequest {
            operation: InfluxOp::WriteLp,
            query,
            body: body.into_bytes(),
            ..Default::default()
        };
        req.headers.insert(HEADER_CONTENT_TYPE.to_string(), "text/plain; charset=utf-8".to_string());

        client.send(req).await?;

        log::info!("Successfully wrote {} point(s) to database: {}", request.points.len(), request.database);

        Ok(())
    }
}
