use std::sync::Once;

use chrono::{Duration, Utc};
use influxdb_access_rs::{Point, TimeseriesAccess};
use rand::random_range;

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        simple_logger::init_with_level(log::Level::Info).unwrap();
        let _ = dotenvy::dotenv();
    });
}

#[tokio::main]
async fn main() {
    setup();

    let access = TimeseriesAccess::from_env().unwrap();

    if !access.test_connection().await {
        log::error!("InfluxDB is not reachable, check INFLUXDB_URL and INFLUXDB_TOKEN");
        return;
    }

    access.create_database().await.unwrap();

    const SENSORS: usize = 3;
    const HOURS: i64 = 24;

    let now = Utc::now();
    let mut total = 0;

    for h in 0..HOURS {
        let points = (0..SENSORS)
            .map(|s| {
                Point::new("iot_sensors")
                    .tag("sensor_id", format!("sensor_{:03}", s + 1))
                    .tag("location", format!("room_{}", s % 2 + 1))
                    .field_double("temperature", 20.0 + random_range(-2.0..2.0))
                    .field_double("humidity", 45.0 + random_range(-5.0..5.0))
                    .field_double("pressure", 1013.25 + random_range(-3.0..3.0))
                    .timestamp(now - Duration::hours(h))
            })
            .collect::<Vec<_>>();

        total += points.len();
        access.write_points(points).await.unwrap();

        log::info!("{}/{}", total, SENSORS * HOURS as usize);
    }

    let rows = access.query("SELECT * FROM iot_sensors ORDER BY time DESC LIMIT 5").await.unwrap();
    for row in rows {
        log::info!("{}", serde_json::Value::Object(row));
    }

    access.close();
}
