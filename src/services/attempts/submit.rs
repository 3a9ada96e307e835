use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttemptService;
use crate::models::ApiResponse;
use crate::models::attempts::requests::SubmitAttemptRequest;
use crate::services::{current_user, error_response};

pub async fn submit_attempt(
    service: &AttemptService,
    request: &HttpRequest,
    attempt_id: i64,
    submit_data: SubmitAttemptRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine
        .submit_attempt(attempt_id, user.id, submit_data.answers)
        .await
    {
        Ok(result) => {
            let message = if result.attempt.state.score().is_some() {
                "提交成功"
            } else {
                "提交成功，部分题目等待教师批改"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, message)))
        }
        Err(e) => Ok(error_response(e)),
    }
}
