use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::models::ApiResponse;
use crate::models::grading::responses::PendingGradingResponse;
use crate::services::error_response;

pub async fn list_pending(
    service: &GradingService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.get_pending_grading(quiz_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PendingGradingResponse { quiz_id, items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}
