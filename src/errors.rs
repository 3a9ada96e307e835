//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称和错误类别。

use std::fmt;

/// 错误类别
///
/// 宿主服务按类别把错误翻译为 API 状态码，引擎本身不做任何重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 资源不存在
    NotFound,
    /// 业务策略拒绝（需要调用方换一种操作）
    Policy,
    /// 身份或归属校验失败
    Authorization,
    /// 输入校验失败
    Validation,
    /// 存储层或配置失败
    Persistence,
}

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - category() 方法 - 返回错误类别
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_quizsystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $category:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum QuizSystemError {
            $($variant(String),)*
        }

        impl QuizSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(QuizSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(QuizSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误类别
            pub fn category(&self) -> ErrorCategory {
                match self {
                    $(QuizSystemError::$variant(_) => ErrorCategory::$category,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(QuizSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl QuizSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        QuizSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_quizsystem_errors! {
    DatabaseConfig("E003", "Database Configuration Error", Persistence),
    DatabaseConnection("E004", "Database Connection Error", Persistence),
    DatabaseOperation("E005", "Database Operation Error", Persistence),
    Validation("E007", "Validation Error", Validation),
    Serialization("E009", "Serialization Error", Persistence),
    Authentication("E012", "Authentication Error", Authorization),

    QuizNotFound("E101", "Quiz Not Found", NotFound),
    QuestionNotFound("E102", "Question Not Found", NotFound),
    OptionNotFound("E103", "Option Not Found", NotFound),
    AttemptNotFound("E104", "Attempt Not Found", NotFound),
    AnswerNotFound("E105", "Answer Not Found", NotFound),

    QuizNotPublished("E201", "Quiz Not Published", Policy),
    MaxAttemptsReached("E202", "Max Attempts Reached", Policy),
    TimeLimitExceeded("E203", "Time Limit Exceeded", Policy),
    AttemptAlreadyComplete("E204", "Attempt Already Complete", Policy),
    InvalidPointsAwarded("E205", "Invalid Points Awarded", Policy),
    CannotGradeAutoGraded("E206", "Cannot Grade Auto-Graded Question", Policy),

    UnauthorizedAccess("E301", "Unauthorized Access", Authorization),
}

impl QuizSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为资源不存在类错误
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

impl fmt::Display for QuizSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for QuizSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for QuizSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        QuizSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for QuizSystemError {
    fn from(err: serde_json::Error) -> Self {
        QuizSystemError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuizSystemError>;
