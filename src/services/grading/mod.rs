pub mod grade;
pub mod pending;
pub mod statistics;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::QuizEngine;
use crate::models::grading::requests::GradeAnswerRequest;
use crate::storage::Storage;

pub struct GradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ActixResult<QuizEngine> {
        super::engine_from_request(self.storage.as_ref(), request)
    }

    // 教师批改主观题
    pub async fn grade_answer(
        &self,
        request: &HttpRequest,
        answer_id: i64,
        grade_data: GradeAnswerRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_answer(self, request, answer_id, grade_data).await
    }

    pub async fn list_pending(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        pending::list_pending(self, request, quiz_id).await
    }

    pub async fn get_statistics(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        statistics::get_statistics(self, request, quiz_id).await
    }
}
