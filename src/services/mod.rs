//! HTTP 服务层：从请求中取出身份和存储，调用引擎，并把结果翻译为 API 响应

pub mod attempts;
pub mod grading;
pub mod quizzes;

pub use attempts::AttemptService;
pub use grading::GradingService;
pub use quizzes::QuizService;

use actix_web::{HttpRequest, HttpResponse, error::ErrorInternalServerError};
use std::sync::Arc;
use tracing::{error, info};

use crate::engine::QuizEngine;
use crate::errors::{ErrorCategory, QuizSystemError};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::CurrentUser;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 从请求中获取存储实例并创建引擎
pub(crate) fn engine_from_request(
    storage: Option<&Arc<dyn Storage>>,
    request: &HttpRequest,
) -> actix_web::Result<QuizEngine> {
    if let Some(storage) = storage {
        return Ok(QuizEngine::new(storage.clone()));
    }

    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| QuizEngine::new(data.get_ref().clone()))
        .ok_or_else(|| {
            error!("Storage not found in app data");
            ErrorInternalServerError("Storage not found in app data")
        })
}

/// 获取当前用户，未认证时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<CurrentUser, HttpResponse> {
    RequireJWT::extract_current_user(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        ))
    })
}

/// 引擎错误对应的业务错误码
pub(crate) fn error_code(err: &QuizSystemError) -> ErrorCode {
    match err {
        QuizSystemError::QuizNotFound(_) => ErrorCode::QuizNotFound,
        QuizSystemError::QuestionNotFound(_) => ErrorCode::QuestionNotFound,
        QuizSystemError::OptionNotFound(_) => ErrorCode::OptionNotFound,
        QuizSystemError::AttemptNotFound(_) => ErrorCode::AttemptNotFound,
        QuizSystemError::AnswerNotFound(_) => ErrorCode::AnswerNotFound,
        QuizSystemError::QuizNotPublished(_) => ErrorCode::QuizNotPublished,
        QuizSystemError::MaxAttemptsReached(_) => ErrorCode::MaxAttemptsReached,
        QuizSystemError::TimeLimitExceeded(_) => ErrorCode::TimeLimitExceeded,
        QuizSystemError::AttemptAlreadyComplete(_) => ErrorCode::AttemptAlreadyComplete,
        QuizSystemError::InvalidPointsAwarded(_) => ErrorCode::InvalidPointsAwarded,
        QuizSystemError::CannotGradeAutoGraded(_) => ErrorCode::CannotGradeAutoGraded,
        QuizSystemError::UnauthorizedAccess(_) => ErrorCode::AttemptPermissionDenied,
        QuizSystemError::Authentication(_) => ErrorCode::Unauthorized,
        QuizSystemError::Validation(_) => ErrorCode::BadRequest,
        QuizSystemError::DatabaseConfig(_)
        | QuizSystemError::DatabaseConnection(_)
        | QuizSystemError::DatabaseOperation(_)
        | QuizSystemError::Serialization(_) => ErrorCode::InternalServerError,
    }
}

/// 把引擎错误翻译为 HTTP 响应
pub(crate) fn error_response(err: QuizSystemError) -> HttpResponse {
    let code = error_code(&err);
    let mut builder = match err.category() {
        ErrorCategory::NotFound => HttpResponse::NotFound(),
        ErrorCategory::Validation => HttpResponse::BadRequest(),
        ErrorCategory::Authorization => HttpResponse::Forbidden(),
        ErrorCategory::Policy => match &err {
            QuizSystemError::InvalidPointsAwarded(_) | QuizSystemError::CannotGradeAutoGraded(_) => {
                HttpResponse::BadRequest()
            }
            _ => HttpResponse::Conflict(),
        },
        ErrorCategory::Persistence => {
            error!("{}", err.format_simple());
            return HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                code,
                "服务器内部错误",
            ));
        }
    };

    info!("Request rejected: {}", err.format_simple());
    builder.json(ApiResponse::error_empty(code, err.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (QuizSystemError::quiz_not_found("x"), StatusCode::NOT_FOUND),
            (QuizSystemError::answer_not_found("x"), StatusCode::NOT_FOUND),
            (QuizSystemError::time_limit_exceeded("x"), StatusCode::CONFLICT),
            (QuizSystemError::attempt_already_complete("x"), StatusCode::CONFLICT),
            (QuizSystemError::max_attempts_reached("x"), StatusCode::CONFLICT),
            (QuizSystemError::quiz_not_published("x"), StatusCode::CONFLICT),
            (QuizSystemError::invalid_points_awarded("x"), StatusCode::BAD_REQUEST),
            (QuizSystemError::cannot_grade_auto_graded("x"), StatusCode::BAD_REQUEST),
            (QuizSystemError::validation("x"), StatusCode::BAD_REQUEST),
            (QuizSystemError::unauthorized_access("x"), StatusCode::FORBIDDEN),
            (
                QuizSystemError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let name = err.error_type();
            assert_eq!(error_response(err).status(), status, "{name}");
        }
    }

    #[test]
    fn test_error_codes_match_variants() {
        assert_eq!(
            error_code(&QuizSystemError::max_attempts_reached("x")),
            ErrorCode::MaxAttemptsReached
        );
        assert_eq!(
            error_code(&QuizSystemError::serialization("x")),
            ErrorCode::InternalServerError
        );
    }
}
