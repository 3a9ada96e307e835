//! QuizSystem - 测验作答与批改服务
//!
//! 基于 Actix Web 构建的课程测验后端，负责作答流程、自动判分与教师批改。
//!
//! # 架构
//! - `config`: 配置管理
//! - `engine`: 作答与批改引擎
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: HTTP 服务层
//! - `storage`: 数据存储层（SeaORM / 内存）
//! - `utils`: 工具函数

pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
