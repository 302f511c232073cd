mod field;
mod point;
pub mod rules;

pub use field::*;
pub use point::*;

/// 查询结果中的一行：列名到值的映射
pub type QueryRow = serde_json::Map<String, serde_json::Value>;
