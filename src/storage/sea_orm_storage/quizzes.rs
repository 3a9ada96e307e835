//! 测验存储操作

use super::SeaOrmStorage;
use crate::entity::quizzes::{ActiveModel, Entity as Quizzes};
use crate::errors::{QuizSystemError, Result};
use crate::models::quizzes::{
    entities::Quiz,
    requests::{CreateQuizRequest, UpdateQuizRequest},
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 创建测验
    pub async fn create_quiz_impl(&self, created_by: i64, req: CreateQuizRequest) -> Result<Quiz> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            lesson_id: Set(req.lesson_id),
            title: Set(req.title),
            description: Set(req.description),
            passing_score: Set(req.passing_score),
            time_limit: Set(req.time_limit),
            max_attempts: Set(req.max_attempts),
            shuffle_questions: Set(req.shuffle_questions.unwrap_or(false)),
            shuffle_options: Set(req.shuffle_options.unwrap_or(false)),
            show_correct_answers: Set(req.show_correct_answers.unwrap_or(false)),
            is_published: Set(req.is_published.unwrap_or(false)),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("创建测验失败: {e}")))?;

        Ok(result.into_quiz())
    }

    /// 通过 ID 获取测验
    pub async fn get_quiz_by_id_impl(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(quiz_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    /// 更新测验
    pub async fn update_quiz_impl(
        &self,
        quiz_id: i64,
        update: UpdateQuizRequest,
    ) -> Result<Option<Quiz>> {
        // 先检查测验是否存在
        let existing = self.get_quiz_by_id_impl(quiz_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(quiz_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(passing_score) = update.passing_score {
            model.passing_score = Set(passing_score);
        }
        if let Some(time_limit) = update.time_limit {
            model.time_limit = Set(Some(time_limit));
        }
        if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(Some(max_attempts));
        }
        if let Some(shuffle_questions) = update.shuffle_questions {
            model.shuffle_questions = Set(shuffle_questions);
        }
        if let Some(shuffle_options) = update.shuffle_options {
            model.shuffle_options = Set(shuffle_options);
        }
        if let Some(show_correct_answers) = update.show_correct_answers {
            model.show_correct_answers = Set(show_correct_answers);
        }
        if let Some(is_published) = update.is_published {
            model.is_published = Set(is_published);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("更新测验失败: {e}")))?;

        self.get_quiz_by_id_impl(quiz_id).await
    }
}
