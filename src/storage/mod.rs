use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{
    attempts::{
        entities::{QuizAnswer, QuizAttempt},
        requests::{AttemptCompletion, NewQuizAttempt},
        responses::AttemptWithAnswers,
    },
    grading::{requests::ManualGrade, responses::ManualGradeOutcome},
    questions::{
        entities::{Question, QuestionOption, QuestionWithOptions},
        requests::{NewQuestion, QuestionOrder},
    },
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, UpdateQuizRequest},
    },
};

use crate::errors::{QuizSystemError, Result};

pub mod memory_storage;
pub mod sea_orm_storage;

/// 使用内存存储的数据库 URL
pub const MEMORY_STORAGE_URL: &str = "memory://";

/// 题目已被作答时的删除错误
pub(crate) fn answered_question_error(question_id: i64) -> QuizSystemError {
    QuizSystemError::validation(format!("题目 {question_id} 已有作答记录，不能删除"))
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 测验管理方法
    // 创建测验
    async fn create_quiz(&self, created_by: i64, quiz: CreateQuizRequest) -> Result<Quiz>;
    // 通过ID获取测验
    async fn get_quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>>;
    // 更新测验（部分字段）
    async fn update_quiz(&self, quiz_id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>>;

    /// 题目管理方法
    // 创建题目及其选项
    async fn create_question(&self, question: NewQuestion) -> Result<QuestionWithOptions>;
    // 通过ID获取题目
    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>>;
    // 列出测验的全部题目，按 order_index 排序
    async fn list_questions_by_quiz(&self, quiz_id: i64) -> Result<Vec<Question>>;
    // 批量获取题目选项，按题目和 order_index 排序
    async fn list_options_by_question_ids(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>>;
    // 删除题目（连同选项）；已有答案引用该题目时拒绝删除
    async fn delete_question(&self, quiz_id: i64, question_id: i64) -> Result<bool>;
    // 批量调整题目顺序，任一题目不属于该测验时整体失败
    async fn reorder_questions(&self, quiz_id: i64, orders: &[QuestionOrder]) -> Result<()>;

    /// 作答记录方法
    // 统计用户在测验中的作答次数
    async fn count_attempts(&self, quiz_id: i64, user_id: i64) -> Result<i64>;
    // 创建作答记录
    async fn create_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt>;
    // 通过ID获取作答记录
    async fn get_attempt_by_id(&self, attempt_id: i64) -> Result<Option<QuizAttempt>>;
    // 列出测验的全部作答记录
    async fn list_attempts_by_quiz(&self, quiz_id: i64) -> Result<Vec<QuizAttempt>>;
    // 列出用户在测验中的作答记录，最新的在前
    async fn list_user_attempts(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizAttempt>>;
    // 完成作答并写入答案；作答记录已完成时返回 None
    async fn complete_attempt(
        &self,
        completion: AttemptCompletion,
    ) -> Result<Option<AttemptWithAnswers>>;

    /// 答案方法
    // 通过ID获取答案
    async fn get_answer_by_id(&self, answer_id: i64) -> Result<Option<QuizAnswer>>;
    // 列出作答记录的全部答案
    async fn list_answers_by_attempt(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>>;
    // 批量列出多个作答记录的答案
    async fn list_answers_by_attempt_ids(&self, attempt_ids: &[i64]) -> Result<Vec<QuizAnswer>>;
    // 写入教师批改结果并重算作答成绩（同一事务）
    async fn apply_manual_grade(&self, grade: ManualGrade) -> Result<ManualGradeOutcome>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = AppConfig::get();
    create_storage_for_url(&config.database.url).await
}

/// 按数据库 URL 选择存储后端
pub async fn create_storage_for_url(url: &str) -> Result<Arc<dyn Storage>> {
    if url == MEMORY_STORAGE_URL {
        tracing::warn!("使用内存存储，进程退出后数据将丢失");
        return Ok(Arc::new(memory_storage::MemoryStorage::new()));
    }

    let storage = sea_orm_storage::SeaOrmStorage::new_async(url).await?;
    Ok(Arc::new(storage))
}
