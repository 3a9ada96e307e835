//! 测验作答与批改引擎
//!
//! 负责作答次数与时限策略、客观题自动判分、主观题延后批改，以及批改后的成绩重算。
//! 引擎不做身份校验，调用方（HTTP 服务层）在进入引擎前完成认证和角色检查。

pub mod authoring;
pub mod grading;
pub mod lifecycle;
pub mod reporting;
pub mod scoring;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{QuizSystemError, Result};
use crate::models::{
    attempts::{
        entities::{QuizAnswer, QuizAttempt},
        requests::AnswerSubmission,
        responses::{AttemptDetailResponse, AttemptWithAnswers},
    },
    grading::responses::QuizStatistics,
    questions::{
        entities::QuestionWithOptions,
        requests::{CreateQuestionRequest, QuestionOrder},
    },
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, UpdateQuizRequest},
        responses::{QuizDetailResponse, QuizForTakingResponse},
    },
    users::entities::CurrentUser,
};
use crate::storage::Storage;

#[derive(Clone)]
pub struct QuizEngine {
    storage: Arc<dyn Storage>,
}

impl QuizEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    // 作答流程
    pub async fn start_attempt(&self, quiz_id: i64, user_id: i64) -> Result<QuizAttempt> {
        lifecycle::start_attempt(self, quiz_id, user_id).await
    }

    pub async fn submit_attempt(
        &self,
        attempt_id: i64,
        user_id: i64,
        answers: Vec<AnswerSubmission>,
    ) -> Result<AttemptWithAnswers> {
        lifecycle::submit_attempt(self, attempt_id, user_id, answers).await
    }

    // 批改
    pub async fn grade_essay_answer(
        &self,
        answer_id: i64,
        instructor_id: i64,
        points_awarded: i32,
        feedback: Option<String>,
    ) -> Result<QuizAnswer> {
        grading::grade_essay_answer(self, answer_id, instructor_id, points_awarded, feedback).await
    }

    // 查询与统计
    pub async fn get_pending_grading(&self, quiz_id: i64) -> Result<Vec<QuizAnswer>> {
        reporting::get_pending_grading(self, quiz_id).await
    }

    pub async fn get_quiz_statistics(&self, quiz_id: i64) -> Result<QuizStatistics> {
        reporting::get_quiz_statistics(self, quiz_id).await
    }

    pub async fn get_attempt(
        &self,
        attempt_id: i64,
        viewer: &CurrentUser,
    ) -> Result<AttemptDetailResponse> {
        reporting::get_attempt(self, attempt_id, viewer).await
    }

    pub async fn list_user_attempts(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizAttempt>> {
        reporting::list_user_attempts(self, quiz_id, user_id).await
    }

    // 出题
    pub async fn create_quiz(&self, created_by: i64, req: CreateQuizRequest) -> Result<Quiz> {
        authoring::create_quiz(self, created_by, req).await
    }

    pub async fn update_quiz(&self, quiz_id: i64, req: UpdateQuizRequest) -> Result<Quiz> {
        authoring::update_quiz(self, quiz_id, req).await
    }

    pub async fn get_quiz_detail(&self, quiz_id: i64) -> Result<QuizDetailResponse> {
        authoring::get_quiz_detail(self, quiz_id).await
    }

    pub async fn get_quiz_for_taking(&self, quiz_id: i64) -> Result<QuizForTakingResponse> {
        authoring::get_quiz_for_taking(self, quiz_id).await
    }

    pub async fn create_question(
        &self,
        quiz_id: i64,
        req: CreateQuestionRequest,
    ) -> Result<QuestionWithOptions> {
        authoring::create_question(self, quiz_id, req).await
    }

    pub async fn delete_question(&self, quiz_id: i64, question_id: i64) -> Result<()> {
        authoring::delete_question(self, quiz_id, question_id).await
    }

    pub async fn reorder_questions(&self, quiz_id: i64, orders: Vec<QuestionOrder>) -> Result<()> {
        authoring::reorder_questions(self, quiz_id, orders).await
    }

    /// 获取测验，不存在时返回 QuizNotFound
    pub(crate) async fn require_quiz(&self, quiz_id: i64) -> Result<Quiz> {
        self.storage
            .get_quiz_by_id(quiz_id)
            .await?
            .ok_or_else(|| QuizSystemError::quiz_not_found(format!("测验 {quiz_id} 不存在")))
    }

    /// 获取作答记录，不存在时返回 AttemptNotFound
    pub(crate) async fn require_attempt(&self, attempt_id: i64) -> Result<QuizAttempt> {
        self.storage
            .get_attempt_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                QuizSystemError::attempt_not_found(format!("作答记录 {attempt_id} 不存在"))
            })
    }

    /// 按顺序加载测验的全部题目及选项
    pub(crate) async fn load_questions(&self, quiz_id: i64) -> Result<Vec<QuestionWithOptions>> {
        let questions = self.storage.list_questions_by_quiz(quiz_id).await?;
        let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let options = self
            .storage
            .list_options_by_question_ids(&question_ids)
            .await?;

        let mut grouped: HashMap<i64, Vec<_>> = HashMap::new();
        for option in options {
            grouped.entry(option.question_id).or_default().push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| {
                let options = grouped.remove(&question.id).unwrap_or_default();
                QuestionWithOptions { question, options }
            })
            .collect())
    }
}
