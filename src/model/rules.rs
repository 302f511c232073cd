use std::sync::LazyLock;

use regex::Regex;

/// 单次写入请求中允许的最大数据点数量
pub const MAX_POINT_COUNT: usize = 10_000;

/// 数据库名称的最大长度
pub const MAX_DATABASE_NAME_LEN: usize = 64;

static DATABASE_NAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").ok());

/// 约束条件：
///
/// - 由英文字母、数字、下划线（_）或者中划线（-）组成
/// - 首字母必须为英文字母或数字
/// - 长度限制为 1~64 个字符
pub fn validate_database_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_DATABASE_NAME_LEN {
        return false;
    }

    DATABASE_NAME_RE.as_ref().is_some_and(|re| re.is_match(name))
}

/// 度量名称、标签和字段的名称不能为空，也不能包含换行符，否则无法编码为 line protocol
pub fn validate_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains(['\n', '\r'])
}

/// 度量名称位于行首，以 `#` 开头的行会被当作注释丢弃
pub fn validate_measurement(name: &str) -> bool {
    validate_identifier(name) && !name.starts_with('#')
}

/// 标签值同样不能为空，line protocol 中没有空标签值的表示方法
pub fn validate_tag_value(value: &str) -> bool {
    validate_identifier(value)
}
