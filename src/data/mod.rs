//! 时序数据的写入和查询
mod query;
mod write_points;

pub use query::*;
pub use write_points::*;

#[cfg(test)]
mod test_data_operations {
    use chrono::{TimeZone, Utc};

    use crate::{
        config::ConnectionConfig,
        error::InfluxError,
        model::Point,
        test_util::CannedServer,
        InfluxClient,
    };

    use super::{query::decode_rows, QueryLanguage, QueryRequest, WriteRequest};

    fn client_for(server: &CannedServer) -> InfluxClient {
        InfluxClient::from_config(&ConnectionConfig::new("apiv3_token").url(&server.url)).unwrap()
    }

    #[tokio::test]
    async fn test_write_points() {
        let server = CannedServer::start(204, "").await;
        let client = client_for(&server);

        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let request = WriteRequest::new("analytics")
            .point(
                Point::new("iot_sensors")
                    .tag("sensor_id", "sensor_001")
                    .tag("location", "room_1")
                    .field_double("temperature", 22.5)
                    .field_double("humidity", 45.2)
                    .timestamp(ts),
            )
            .point(Point::new("iot_sensors").tag("sensor_id", "sensor_002").field_double("temperature", 21.0));

        let resp = client.write(request).send().await;
        assert!(resp.is_ok(), "{:?}", resp);

        let recorded = server.requests();
        assert_eq!(1, recorded.len());

        let req = &recorded[0];
        assert!(req.head.starts_with("POST /api/v3/write_lp?accept_partial=false&db=analytics&precision=nanosecond "));
        assert!(req.header("content-type").is_some_and(|v| v.starts_with("text/plain")));
        assert_eq!(
            "iot_sensors,location=room_1,sensor_id=sensor_001 humidity=45.2,temperature=22.5 1700000000000000000\n\
             iot_sensors,sensor_id=sensor_002 temperature=21",
            req.body
        );
    }

    #[tokio::test]
    async fn test_write_rejected_by_backend() {
        let server = CannedServer::start(400, r#"{"error":"parsing failed for write_lp endpoint"}"#).await;
        let client = client_for(&server);

        let request = WriteRequest::new("analytics").point(Point::new("iot_sensors").field_integer("count", 1));

        match client.write(request).send().await {
            Err(InfluxError::StatusError(status, msg)) => {
                assert_eq!(400, status.as_u16());
                assert!(msg.contains("parsing failed"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_validation_happens_before_network() {
        let server = CannedServer::start(204, "").await;
        let client = client_for(&server);

        let res = client.write(WriteRequest::new("analytics")).send().await;
        assert!(matches!(res, Err(InfluxError::ValidationFailed(_))));

        let res = client
            .write(WriteRequest::new("bad db").point(Point::new("m").field_integer("v", 1)))
            .send()
            .await;
        assert!(matches!(res, Err(InfluxError::ValidationFailed(_))));

        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_query_sql() {
        let server = CannedServer::start(
            200,
            r#"[{"sensor_id":"sensor_001","temperature":22.5,"time":"2025-01-01T00:00:00"},{"sensor_id":"sensor_002","temperature":21.0,"time":"2025-01-01T01:00:00"}]"#,
        )
        .await;
        let client = client_for(&server);

        let rows = client
            .query(QueryRequest::new("analytics", "SELECT * FROM iot_sensors ORDER BY time DESC LIMIT 5"))
            .send()
            .await
            .unwrap();

        assert_eq!(2, rows.len());
        assert_eq!(Some("sensor_001"), rows[0].get("sensor_id").and_then(|v| v.as_str()));
        assert_eq!(Some(21.0), rows[1].get("temperature").and_then(|v| v.as_f64()));

        let recorded = server.requests();
        assert!(recorded[0].head.starts_with("POST /api/v3/query_sql "));

        let body: serde_json::Value = serde_json::from_str(&recorded[0].body).unwrap();
        assert_eq!("analytics", body["db"]);
        assert_eq!("SELECT * FROM iot_sensors ORDER BY time DESC LIMIT 5", body["q"]);
        assert_eq!("json", body["format"]);
    }

    #[tokio::test]
    async fn test_query_influxql_endpoint() {
        let server = CannedServer::start(200, "").await;
        let client = client_for(&server);

        let rows = client
            .query(QueryRequest::new("analytics", "SHOW MEASUREMENTS").language(QueryLanguage::InfluxQl))
            .send()
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert!(server.requests()[0].head.starts_with("POST /api/v3/query_influxql "));
    }

    #[tokio::test]
    async fn test_query_empty_statement() {
        let server = CannedServer::start(200, "[]").await;
        let client = client_for(&server);

        let res = client.query(QueryRequest::new("analytics", "   ")).send().await;
        assert!(matches!(res, Err(InfluxError::ValidationFailed(_))));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_decode_rows() {
        assert!(decode_rows(b"").unwrap().is_empty());
        assert!(decode_rows(b" \n").unwrap().is_empty());
        assert!(decode_rows(b"[]").unwrap().is_empty());
        assert_eq!(1, decode_rows(br#"[{"1":1}]"#).unwrap().len());
        assert!(matches!(decode_rows(b"not json"), Err(InfluxError::JsonError(_))));
    }
}
