//! 配置管理
//!
//! 配置来源优先级：环境变量 > config.{APP_ENV}.toml > config.toml

mod r#impl;
mod structs;

pub use structs::*;
