use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use crate::models::ApiResponse;
use crate::models::quizzes::requests::CreateQuizRequest;
use crate::services::{current_user, error_response};

pub async fn create_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_data: CreateQuizRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request)?;

    match engine.create_quiz(user.id, quiz_data).await {
        Ok(quiz) => Ok(HttpResponse::Created().json(ApiResponse::success(quiz, "测验创建成功"))),
        Err(e) => Ok(error_response(e)),
    }
}
