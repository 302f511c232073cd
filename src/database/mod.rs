//! 数据库管理
mod create_database;

pub use create_database::*;
