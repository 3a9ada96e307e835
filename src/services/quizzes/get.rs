use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use crate::models::ApiResponse;
use crate::services::error_response;

pub async fn get_quiz_detail(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.get_quiz_detail(quiz_id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "查询成功"))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn get_quiz_for_taking(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.get_quiz_for_taking(quiz_id).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view, "查询成功"))),
        Err(e) => Ok(error_response(e)),
    }
}
