use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfluxError {
    /// 启动配置缺失或非法，属于致命错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 构造 live 客户端失败，例如 endpoint 格式错误
    #[error("Client initialization failed: {0}")]
    ClientInitError(String),

    #[error("Write failed: {0}")]
    WriteError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Access layer has been closed")]
    Closed,

    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    UrlError(#[from] url::ParseError),

    #[error("InfluxDB responded with non-successful code: {0}. response message is: {1}")]
    StatusError(StatusCode, String),
}

impl InfluxError {
    /// 把传输层错误包装成写入错误。校验失败、已关闭和客户端初始化错误保持原样
    pub(crate) fn into_write_error(self) -> Self {
        match self {
            Self::ValidationFailed(_) | Self::Closed | Self::ClientInitError(_) | Self::WriteError(_) => self,
            other => Self::WriteError(other.to_string()),
        }
    }

    pub(crate) fn into_query_error(self) -> Self {
        match self {
            Self::ValidationFailed(_) | Self::Closed | Self::ClientInitError(_) | Self::QueryError(_) => self,
            other => Self::QueryError(other.to_string()),
        }
    }

    pub(crate) fn into_database_error(self) -> Self {
        match self {
            Self::ValidationFailed(_) | Self::Closed | Self::ClientInitError(_) | Self::DatabaseError(_) => self,
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test_error {
    use reqwest::StatusCode;

    use super::InfluxError;

    #[test]
    fn test_wrap_keeps_backend_message() {
        let e = InfluxError::StatusError(StatusCode::BAD_REQUEST, "error parsing SQL statement".to_string()).into_query_error();

        match e {
            InfluxError::QueryError(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("error parsing SQL statement"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrap_passes_validation_through() {
        let e = InfluxError::ValidationFailed("measurement can not be empty".to_string()).into_write_error();
        assert!(matches!(e, InfluxError::ValidationFailed(_)));

        let e = InfluxError::Closed.into_query_error();
        assert!(matches!(e, InfluxError::Closed));
    }
}
