use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::QuizService;
use crate::models::ApiResponse;
use crate::models::questions::requests::{CreateQuestionRequest, QuestionOrder};
use crate::services::error_response;

pub async fn create_question(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    question_data: CreateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.create_question(quiz_id, question_data).await {
        Ok(question) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(question, "题目创建成功")))
        }
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn delete_question(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    question_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.delete_question(quiz_id, question_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("题目删除成功"))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn reorder_questions(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    orders: Vec<QuestionOrder>,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request)?;

    match engine.reorder_questions(quiz_id, orders).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("题目顺序已更新"))),
        Err(e) => Ok(error_response(e)),
    }
}
