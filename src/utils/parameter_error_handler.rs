use actix_web::{
    Error, HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

// JSON 请求体解析失败时返回统一的错误响应
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("JSON payload error on {}: {}", req.path(), err);

    let response = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "请求体过大",
            ))
        }
        JsonPayloadError::ContentType => HttpResponse::UnsupportedMediaType().json(
            ApiResponse::error_empty(ErrorCode::BadRequest, "Content-Type 必须为 application/json"),
        ),
        _ => HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("请求体格式错误: {err}"),
        )),
    };

    InternalError::from_response(err, response).into()
}

// 查询参数解析失败时返回统一的错误响应
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Query payload error on {}: {}", req.path(), err);

    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("查询参数错误: {err}"),
    ));

    InternalError::from_response(err, response).into()
}
