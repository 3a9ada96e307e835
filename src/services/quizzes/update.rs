use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::QuizService;
use crate::models::ApiResponse;
use crate::models::quizzes::requests::UpdateQuizRequest;
use crate::services::{current_user, error_response};

pub async fn update_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    update_data: UpdateQuizRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.update_quiz(quiz_id, update_data).await {
        Ok(quiz) => {
            info!("Quiz {} updated by {}", quiz.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(quiz, "测验更新成功")))
        }
        Err(e) => Ok(error_response(e)),
    }
}
