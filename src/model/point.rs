use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{error::InfluxError, InfluxResult};

use super::{
    rules::{validate_identifier, validate_measurement, validate_tag_value},
    FieldValue,
};

/// 写入单元：一个度量下的一个数据点
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    /// 度量名称，相当于表名
    pub measurement: String,

    /// 标签。用于过滤和分组，只能是字符串
    pub tags: BTreeMap<String, String>,

    /// 字段，实际的测量值
    pub fields: BTreeMap<String, FieldValue>,

    /// 时间戳。为 `None` 时由服务端（或者模拟存储）填充当前时间
    pub timestamp: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            ..Default::default()
        }
    }

    /// 增加一个标签
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// 设置所有标签
    pub fn tags(mut self, tags: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        self.tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// 添加/更新一个字段
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// 设置所有字段
    pub fn fields(mut self, fields: impl IntoIterator<Item = (impl Into<String>, impl Into<FieldValue>)>) -> Self {
        self.fields = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// 添加/更新双精度字段
    pub fn field_double(self, name: impl Into<String>, value: f64) -> Self {
        self.field(name, FieldValue::Double(value))
    }

    /// 添加/更新整数字段
    pub fn field_integer(self, name: impl Into<String>, value: i64) -> Self {
        self.field(name, FieldValue::Integer(value))
    }

    /// 添加/更新布尔值字段
    pub fn field_bool(self, name: impl Into<String>, value: bool) -> Self {
        self.field(name, FieldValue::Boolean(value))
    }

    /// 添加/更新字符串字段
    pub fn field_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(name, FieldValue::String(value.into()))
    }

    /// 设置时间戳
    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub(crate) fn validate(&self) -> InfluxResult<()> {
        if self.measurement.is_empty() {
            return Err(InfluxError::ValidationFailed("measurement can not be empty".to_string()));
        }

        if !validate_measurement(&self.measurement) {
            return Err(InfluxError::ValidationFailed(format!("invalid measurement: {:?}", self.measurement)));
        }

        if self.fields.is_empty() {
            return Err(InfluxError::ValidationFailed(format!(
                "point of measurement {} must have at least one field",
                self.measurement
            )));
        }

        for (k, v) in &self.tags {
            if !validate_identifier(k) {
                return Err(InfluxError::ValidationFailed(format!("invalid tag name: {:?}", k)));
            }
            if !validate_tag_value(v) {
                return Err(InfluxError::ValidationFailed(format!("invalid value of tag {}: {:?}", k, v)));
            }
        }

        for (k, v) in &self.fields {
            if !validate_identifier(k) {
                return Err(InfluxError::ValidationFailed(format!("invalid field name: {:?}", k)));
            }

            if !v.is_writable() {
                return Err(InfluxError::ValidationFailed(format!("invalid value of field {}: {:?}", k, v)));
            }
        }

        if let Some(ts) = &self.timestamp {
            if ts.timestamp_nanos_opt().is_none() {
                return Err(InfluxError::ValidationFailed(format!("timestamp out of range: {}", ts)));
            }
        }

        Ok(())
    }

    /// 编码为 line protocol 的一行（不包含换行符）。时间戳精度为纳秒
    pub fn to_line_protocol(&self) -> InfluxResult<String> {
        self.validate()?;

        let mut line = String::new();
        escape_into(&mut line, &self.measurement, MEASUREMENT_SPECIALS);

        for (k, v) in &self.tags {
            line.push(',');
            escape_into(&mut line, k, KEY_SPECIALS);
            line.push('=');
            escape_into(&mut line, v, KEY_SPECIALS);
        }

        line.push(' ');

        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            escape_into(&mut line, k, KEY_SPECIALS);
            line.push('=');
            v.write_line_protocol(&mut line);
        }

        if let Some(ns) = self.timestamp.and_then(|ts| ts.timestamp_nanos_opt()) {
            line.push(' ');
            line.push_str(&ns.to_string());
        }

        Ok(line)
    }
}

/// 反斜杠本身也要转义，否则以 `\` 结尾的值会吞掉后面的分隔符
const MEASUREMENT_SPECIALS: &[char] = &['\\', ',', ' '];
const KEY_SPECIALS: &[char] = &['\\', ',', '=', ' '];

fn escape_into(out: &mut String, s: &str, specials: &[char]) {
    for c in s.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
