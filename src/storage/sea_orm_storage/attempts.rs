//! 作答记录存储操作

use super::{SeaOrmStorage, to_timestamp};
use crate::entity::quiz_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as QuizAnswers,
};
use crate::entity::quiz_attempts::{ActiveModel, Column, Entity as QuizAttempts};
use crate::errors::{QuizSystemError, Result};
use crate::models::attempts::{
    entities::QuizAttempt,
    requests::{AttemptCompletion, NewQuizAttempt},
    responses::AttemptWithAnswers,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 统计用户在测验中的作答次数
    pub async fn count_attempts_impl(&self, quiz_id: i64, user_id: i64) -> Result<i64> {
        let count = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答次数失败: {e}")))?;

        Ok(count as i64)
    }

    /// 创建作答记录
    ///
    /// (quiz_id, user_id, attempt_number) 上有唯一索引，并发开始作答时后到者插入失败。
    pub async fn create_attempt_impl(&self, req: NewQuizAttempt) -> Result<QuizAttempt> {
        let model = ActiveModel {
            quiz_id: Set(req.quiz_id),
            user_id: Set(req.user_id),
            attempt_number: Set(req.attempt_number),
            started_at: Set(to_timestamp(req.started_at)),
            completed_at: Set(None),
            score: Set(None),
            is_passed: Set(None),
            time_spent: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("创建作答记录失败: {e}")))?;

        Ok(result.into_attempt())
    }

    /// 通过 ID 获取作答记录
    pub async fn get_attempt_by_id_impl(&self, attempt_id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(attempt_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    /// 列出测验的全部作答记录
    pub async fn list_attempts_by_quiz_impl(&self, quiz_id: i64) -> Result<Vec<QuizAttempt>> {
        let attempts = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                QuizSystemError::database_operation(format!("查询作答记录列表失败: {e}"))
            })?;

        Ok(attempts.into_iter().map(|m| m.into_attempt()).collect())
    }

    /// 列出用户在测验中的作答记录
    pub async fn list_user_attempts_impl(
        &self,
        quiz_id: i64,
        user_id: i64,
    ) -> Result<Vec<QuizAttempt>> {
        let attempts = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| {
                QuizSystemError::database_operation(format!("查询用户作答记录失败: {e}"))
            })?;

        Ok(attempts.into_iter().map(|m| m.into_attempt()).collect())
    }

    /// 完成作答
    ///
    /// 以 `completed_at IS NULL` 为条件更新作答记录，只有更新成功的一方才写入答案。
    pub async fn complete_attempt_impl(
        &self,
        completion: AttemptCompletion,
    ) -> Result<Option<AttemptWithAnswers>> {
        let AttemptCompletion {
            attempt_id,
            state,
            answers,
        } = completion;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let completed_at = state.completed_at().map(to_timestamp);
        let updated = QuizAttempts::update_many()
            .col_expr(Column::CompletedAt, Expr::value(completed_at))
            .col_expr(Column::TimeSpent, Expr::value(state.time_spent()))
            .col_expr(Column::Score, Expr::value(state.score()))
            .col_expr(Column::IsPassed, Expr::value(state.is_passed()))
            .filter(Column::Id.eq(attempt_id))
            .filter(Column::CompletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("完成作答失败: {e}")))?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        for answer in answers {
            let model = AnswerActiveModel {
                attempt_id: Set(attempt_id),
                question_id: Set(answer.question_id),
                text_answer: Set(answer.text_answer),
                selected_option_id: Set(answer.selected_option_id),
                is_correct: Set(answer.grade.as_is_correct()),
                points_awarded: Set(answer.points_awarded),
                feedback: Set(None),
                graded_by: Set(None),
                graded_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            };
            model
                .insert(&txn)
                .await
                .map_err(|e| QuizSystemError::database_operation(format!("保存答案失败: {e}")))?;
        }

        let attempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答记录失败: {e}")))?
            .ok_or_else(|| {
                QuizSystemError::attempt_not_found(format!("作答记录 {attempt_id} 不存在"))
            })?;

        let saved_answers = QuizAnswers::find()
            .filter(AnswerColumn::AttemptId.eq(attempt_id))
            .order_by_asc(AnswerColumn::Id)
            .all(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询答案失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(AttemptWithAnswers {
            attempt: attempt.into_attempt(),
            answers: saved_answers.into_iter().map(|m| m.into_answer()).collect(),
        }))
    }
}
