//! 内存中的模拟数据存储，用于没有配置 InfluxDB 的场景

use std::sync::{Mutex, PoisonError};

use chrono::{Duration, SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;

use crate::model::{Point, QueryRow};

/// 模拟查询使用的序列名称
pub const MOCK_SERIES: &str = "iot_sensors";

/// 模拟查询默认返回的行数
pub const DEFAULT_MOCK_ROWS: usize = 10;

/// 相邻两行之间的时间间隔（秒）
pub const MOCK_STEP_SECONDS: i64 = 3600;

/// 生成的字段：名称、基准值、最大偏差
pub const MOCK_FIELDS: &[(&str, f64, f64)] = &[("temperature", 20.0, 2.0), ("humidity", 45.0, 5.0)];

/// 循环使用的 `sensor_id` 标签值
pub const MOCK_SENSOR_IDS: &[&str] = &["sensor_001", "sensor_002", "sensor_003"];

/// 按写入顺序保存数据点。只增不减，进程退出即丢弃
#[derive(Debug, Default)]
pub struct MockStore {
    points: Mutex<Vec<Point>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个数据点。没有时间戳的数据点使用当前时间
    pub fn append(&self, point: Point) {
        let mut point = point;
        if point.timestamp.is_none() {
            point.timestamp = Some(Utc::now());
        }

        // 追加操作不会让 Vec 处于不一致的状态，锁中毒时直接继续使用
        self.points.lock().unwrap_or_else(PoisonError::into_inner).push(point);
    }

    pub fn len(&self) -> usize {
        self.points.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已写入数据点的快照
    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// 生成 `count` 行模拟数据。第 0 行的时间为当前时间，之后每行向前推一个小时。
    /// 字段值在基准值附近随机波动，`sensor_id` 在固定的几个值之间循环。
    ///
    /// `series_name` 只写入结果中的 `measurement` 列，不影响生成的内容
    pub fn generate(&self, series_name: &str, count: usize) -> Vec<QueryRow> {
        let now = Utc::now();
        let mut rng = rand::rng();

        (0..count)
            .map(|i| {
                let ts = now - Duration::seconds(MOCK_STEP_SECONDS * i as i64);

                let mut row = QueryRow::new();
                row.insert("measurement".to_string(), Value::from(series_name));
                row.insert("timestamp".to_string(), Value::from(ts.to_rfc3339_opts(SecondsFormat::Micros, true)));

                for (name, baseline, bound) in MOCK_FIELDS {
                    let v = baseline + rng.random_range(-bound..=*bound);
                    row.insert(name.to_string(), Value::from(v));
                }

                row.insert("sensor_id".to_string(), Value::from(MOCK_SENSOR_IDS[i % MOCK_SENSOR_IDS.len()]));

                row
            })
            .collect()
    }
}
