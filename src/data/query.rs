use serde::Serialize;

use crate::{add_per_request_options, error::InfluxError, model::QueryRow, InfluxClient, InfluxOp, InfluxRequest, InfluxResult, HEADER_CONTENT_TYPE};

/// 查询语言
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum QueryLanguage {
    #[default]
    Sql,
    InfluxQl,
}

impl QueryLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::InfluxQl => "influxql",
        }
    }

    fn operation(&self) -> InfluxOp {
        match self {
            Self::Sql => InfluxOp::QuerySql,
            Self::InfluxQl => InfluxOp::QueryInfluxQl,
        }
    }
}

/// 查询数据。结果以 JSON 格式返回，每个对象就是一行
///
/// 官方文档：<https://docs.influxdata.com/influxdb3/core/query-data/execute-queries/influxdb3-http-api/>
#[derive(Debug, Default, Clone)]
pub struct QueryRequest {
    /// 数据库名称
    pub database: String,

    /// 查询语句
    pub query: String,

    /// 查询语言。见：[`QueryLanguage`]
    pub language: QueryLanguage,
}

#[derive(Serialize)]
struct QueryPayload<'a> {
    db: &'a str,
    q: &'a str,
    format: &'a str,
}

impl QueryRequest {
    pub fn new(database: &str, query: impl Into<String>) -> Self {
        Self {
            database: database.to_string(),
            query: query.into(),
            language: QueryLanguage::Sql,
        }
    }

    /// 设置查询语句
    pub fn query(mut self, query: impl AsRef<str>) -> Self {
        self.query = query.as_ref().to_string();

        self
    }

    /// 设置查询语言
    pub fn language(mut self, language: QueryLanguage) -> Self {
        self.language = language;

        self
    }

    pub(crate) fn validate(&self) -> InfluxResult<()> {
        if self.query.trim().is_empty() {
            return Err(InfluxError::ValidationFailed("query statement can not be empty".to_string()));
        }

        if self.database.is_empty() {
            return Err(InfluxError::ValidationFailed("database can not be empty".to_string()));
        }

        Ok(())
    }

    pub(crate) fn encode_body(&self) -> InfluxResult<Vec<u8>> {
        let payload = QueryPayload {
            db: &self.database,
            q: &self.query,
            format: "json",
        };

        Ok(serde_json::to_vec(&payload)?)
    }
}

/// 解析查询响应。空的响应体表示没有数据
pub(crate) fn decode_rows(bytes: &[u8]) -> InfluxResult<Vec<QueryRow>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(vec![]);
    }

    Ok(serde_json::from_slice::<Vec<QueryRow>>(bytes)?)
}

#[derive(Debug, Clone)]
pub struct QueryOperation {
    client: InfluxClient,
    request: QueryRequest,
}

add_per_request_options!(QueryOperation);

impl QueryOperation {
    pub(crate) fn new(client: InfluxClient, request: QueryRequest) -> Self {
        Self { client, request }
    }

    /// 一次性返回所有行。任何错误都会导致整个查询失败，不会返回部分结果
    pub async fn send(self) -> InfluxResult<Vec<QueryRow>> {
        self.request.validate()?;

        let Self { client, request } = self;

        let mut req = InfluxRequest {
            operation: request.language.operation(),
            body: request.encode_body()?,
            ..Default::default()
        };
        req.headers.insert(HEADER_CONTENT_TYPE.to_string(), "application/json".to_string());

        log::debug!("query ({}): {}", request.language.as_str(), request.query);

        let resp = client.send(req).await?;
        let rows = decode_rows(&resp.bytes().await?)?;

        log::debug!("query returned {} row(s)", rows.len());

        Ok(rows)
    }
}
