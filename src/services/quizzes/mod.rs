pub mod create;
pub mod get;
pub mod questions;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::QuizEngine;
use crate::models::questions::requests::{CreateQuestionRequest, QuestionOrder};
use crate::models::quizzes::requests::{CreateQuizRequest, UpdateQuizRequest};
use crate::storage::Storage;

pub struct QuizService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ActixResult<QuizEngine> {
        super::engine_from_request(self.storage.as_ref(), request)
    }

    // 教师创建测验
    pub async fn create_quiz(
        &self,
        request: &HttpRequest,
        quiz_data: CreateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_quiz(self, request, quiz_data).await
    }

    // 教师查看测验详情（含正确答案）
    pub async fn get_quiz_detail(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_quiz_detail(self, request, quiz_id).await
    }

    // 学生获取作答视图
    pub async fn get_quiz_for_taking(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_quiz_for_taking(self, request, quiz_id).await
    }

    pub async fn update_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        update_data: UpdateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_quiz(self, request, quiz_id, update_data).await
    }

    pub async fn create_question(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        question_data: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::create_question(self, request, quiz_id, question_data).await
    }

    pub async fn delete_question(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        question_id: i64,
    ) -> ActixResult<HttpResponse> {
        questions::delete_question(self, request, quiz_id, question_id).await
    }

    pub async fn reorder_questions(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        orders: Vec<QuestionOrder>,
    ) -> ActixResult<HttpResponse> {
        questions::reorder_questions(self, request, quiz_id, orders).await
    }
}
