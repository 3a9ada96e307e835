use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::models::ApiResponse;
use crate::services::error_response;

pub async fn get_statistics(
    service: &GradingService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.get_quiz_statistics(quiz_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "查询成功"))),
        Err(e) => Ok(error_response(e)),
    }
}
