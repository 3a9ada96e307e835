use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttemptService;
use crate::models::ApiResponse;
use crate::services::{current_user, error_response};

pub async fn get_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    attempt_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.get_attempt(attempt_id, &user).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn list_my_attempts(
    service: &AttemptService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.list_user_attempts(quiz_id, user.id).await {
        Ok(attempts) => Ok(HttpResponse::Ok().json(ApiResponse::success(attempts, "查询成功"))),
        Err(e) => Ok(error_response(e)),
    }
}
