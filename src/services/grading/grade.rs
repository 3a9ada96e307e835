use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradingService;
use crate::models::ApiResponse;
use crate::models::grading::requests::GradeAnswerRequest;
use crate::services::{current_user, error_response};

pub async fn grade_answer(
    service: &GradingService,
    request: &HttpRequest,
    answer_id: i64,
    grade_data: GradeAnswerRequest,
) -> ActixResult<HttpResponse> {
    let instructor = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine
        .grade_essay_answer(
            answer_id,
            instructor.id,
            grade_data.points_awarded,
            grade_data.feedback,
        )
        .await
    {
        Ok(answer) => Ok(HttpResponse::Ok().json(ApiResponse::success(answer, "批改成功"))),
        Err(e) => Ok(error_response(e)),
    }
}
