use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttemptService;
use crate::models::ApiResponse;
use crate::services::{current_user, error_response};

pub async fn start_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.start_attempt(quiz_id, user.id).await {
        Ok(attempt) => Ok(HttpResponse::Created().json(ApiResponse::success(attempt, "开始作答"))),
        Err(e) => Ok(error_response(e)),
    }
}
