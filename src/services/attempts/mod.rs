pub mod get;
pub mod start;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::QuizEngine;
use crate::models::attempts::requests::SubmitAttemptRequest;
use crate::storage::Storage;

pub struct AttemptService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttemptService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ActixResult<QuizEngine> {
        super::engine_from_request(self.storage.as_ref(), request)
    }

    // 开始一次新的作答
    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_attempt(self, request, quiz_id).await
    }

    // 提交作答
    pub async fn submit_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        submit_data: SubmitAttemptRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_attempt(self, request, attempt_id, submit_data).await
    }

    pub async fn get_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_attempt(self, request, attempt_id).await
    }

    // 当前用户在某个测验下的作答记录
    pub async fn list_my_attempts(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::list_my_attempts(self, request, quiz_id).await
    }
}
