//! 基础设施：配置、日志、数据库

pub mod config;
pub mod database;
pub mod logger;
