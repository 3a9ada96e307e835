//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod answers;
mod attempts;
mod questions;
mod quizzes;

use crate::config::AppConfig;
use crate::errors::{QuizSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 时间统一以秒级时间戳落库
pub(crate) fn to_timestamp(dt: chrono::DateTime<chrono::Utc>) -> i64 {
    dt.timestamp()
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async(url: &str) -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| QuizSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| QuizSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| QuizSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(QuizSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 测验模块
    async fn create_quiz(&self, created_by: i64, quiz: CreateQuizRequest) -> Result<Quiz> {
        self.create_quiz_impl(created_by, quiz).await
    }

    async fn get_quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(quiz_id).await
    }

    async fn update_quiz(&self, quiz_id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>> {
        self.update_quiz_impl(quiz_id, update).await
    }

    // 题目模块
    async fn create_question(&self, question: NewQuestion) -> Result<QuestionWithOptions> {
        self.create_question_impl(question).await
    }

    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(question_id).await
    }

    async fn list_questions_by_quiz(&self, quiz_id: i64) -> Result<Vec<Question>> {
        self.list_questions_by_quiz_impl(quiz_id).await
    }

    async fn list_options_by_question_ids(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>> {
        self.list_options_by_question_ids_impl(question_ids).await
    }

    async fn delete_question(&self, quiz_id: i64, question_id: i64) -> Result<bool> {
        self.delete_question_impl(quiz_id, question_id).await
    }

    async fn reorder_questions(&self, quiz_id: i64, orders: &[QuestionOrder]) -> Result<()> {
        self.reorder_questions_impl(quiz_id, orders).await
    }

    // 作答记录模块
    async fn count_attempts(&self, quiz_id: i64, user_id: i64) -> Result<i64> {
        self.count_attempts_impl(quiz_id, user_id).await
    }

    async fn create_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        self.create_attempt_impl(attempt).await
    }

    async fn get_attempt_by_id(&self, attempt_id: i64) -> Result<Option<QuizAttempt>> {
        self.get_attempt_by_id_impl(attempt_id).await
    }

    async fn list_attempts_by_quiz(&self, quiz_id: i64) -> Result<Vec<QuizAttempt>> {
        self.list_attempts_by_quiz_impl(quiz_id).await
    }

    async fn list_user_attempts(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizAttempt>> {
        self.list_user_attempts_impl(quiz_id, user_id).await
    }

    async fn complete_attempt(
        &self,
        completion: AttemptCompletion,
    ) -> Result<Option<AttemptWithAnswers>> {
        self.complete_attempt_impl(completion).await
    }

    // 答案模块
    async fn get_answer_by_id(&self, answer_id: i64) -> Result<Option<QuizAnswer>> {
        self.get_answer_by_id_impl(answer_id).await
    }

    async fn list_answers_by_attempt(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        self.list_answers_by_attempt_impl(attempt_id).await
    }

    async fn list_answers_by_attempt_ids(&self, attempt_ids: &[i64]) -> Result<Vec<QuizAnswer>> {
        self.list_answers_by_attempt_ids_impl(attempt_ids).await
    }

    async fn apply_manual_grade(&self, grade: ManualGrade) -> Result<ManualGradeOutcome> {
        self.apply_manual_grade_impl(grade).await
    }
}
