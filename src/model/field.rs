use serde::{Deserialize, Serialize};

/// 字段值。InfluxDB 的字段可以是数值、布尔值或者字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl FieldValue {
    /// 按照 line protocol 的格式写出字段值
    ///
    /// - 整数带 `i` 后缀
    /// - 浮点数使用最短的可往返表示
    /// - 字符串使用双引号包裹，并转义 `"` 和 `\`
    pub(crate) fn write_line_protocol(&self, out: &mut String) {
        match self {
            Self::Integer(n) => {
                out.push_str(&n.to_string());
                out.push('i');
            }
            Self::Double(d) => out.push_str(&d.to_string()),
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::String(s) => {
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
        }
    }

    /// NaN 和无穷大无法写入 InfluxDB
    pub(crate) fn is_writable(&self) -> bool {
        match self {
            Self::Double(d) => d.is_finite(),
            _ => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Double(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
