use reqwest::StatusCode;
use serde::Serialize;

use crate::{add_per_request_options, error::InfluxError, model::rules::validate_database_name, InfluxClient, InfluxOp, InfluxRequest, InfluxResult, HEADER_CONTENT_TYPE};

#[derive(Serialize)]
struct CreateDatabasePayload<'a> {
    db: &'a str,
}

/// 创建数据库。InfluxDB 3 在第一次写入时也会自动创建数据库，这里用于提前显式创建
///
/// 官方文档：<https://docs.influxdata.com/influxdb3/core/admin/databases/create/>
#[derive(Debug, Clone)]
pub struct CreateDatabaseOperation {
    client: InfluxClient,
    database: String,
}

add_per_request_options!(CreateDatabaseOperation);

impl CreateDatabaseOperation {
    pub(crate) fn new(client: InfluxClient, database: &str) -> Self {
        Self {
            client,
            database: database.to_string(),
        }
    }

    /// 数据库已经存在（`409 Conflict`）时视为成功
    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, database } = self;

        if !validate_database_name(&database) {
            return Err(InfluxError::ValidationFailed(format!("invalid database name: {}", database)));
        }

        let mut req = InfluxRequest {
            operation: InfluxOp::CreateDatabase,
            body: serde_json::to_vec(&CreateDatabasePayload { db: &database })?,
            ..Default::default()
        };
        req.headers.insert(HEADER_CONTENT_TYPE.to_string(), "application/json".to_string());

        match client.send(req).await {
            Ok(_) => {
                log::info!("Database '{}' created", database);
                Ok(())
            }
            Err(InfluxError::StatusError(status, _)) if status == StatusCode::CONFLICT => {
                log::info!("Database '{}' already exists", database);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
