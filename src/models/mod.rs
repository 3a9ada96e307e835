//! 数据模型定义
//!
//! - `entities`: 业务实体
//! - `requests`: HTTP 请求体与存储层内部参数
//! - `responses`: HTTP 响应体

pub mod attempts;
pub mod common;
pub mod grading;
pub mod questions;
pub mod quizzes;
pub mod users;

pub use common::response::ApiResponse;

/// 应用启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 测验相关
    QuizNotFound = 2001,
    QuizNotPublished = 2002,
    QuestionNotFound = 2003,
    OptionNotFound = 2004,

    // 作答相关
    AttemptNotFound = 3001,
    MaxAttemptsReached = 3002,
    TimeLimitExceeded = 3003,
    AttemptAlreadyComplete = 3004,
    AttemptPermissionDenied = 3005,

    // 批改相关
    AnswerNotFound = 4001,
    InvalidPointsAwarded = 4002,
    CannotGradeAutoGraded = 4003,
}
