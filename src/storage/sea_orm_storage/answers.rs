//! 答案存储操作

use super::{SeaOrmStorage, to_timestamp};
use crate::entity::quiz_answers::{ActiveModel, Column, Entity as QuizAnswers};
use crate::entity::quiz_attempts::{Column as AttemptColumn, Entity as QuizAttempts};
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    attempts::entities::{QuizAnswer, QuizAttempt},
    grading::{requests::ManualGrade, responses::ManualGradeOutcome},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 通过 ID 获取答案
    pub async fn get_answer_by_id_impl(&self, answer_id: i64) -> Result<Option<QuizAnswer>> {
        let result = QuizAnswers::find_by_id(answer_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询答案失败: {e}")))?;

        Ok(result.map(|m| m.into_answer()))
    }

    /// 列出作答记录的全部答案
    pub async fn list_answers_by_attempt_impl(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        let answers = QuizAnswers::find()
            .filter(Column::AttemptId.eq(attempt_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询答案失败: {e}")))?;

        Ok(answers.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 批量列出多个作答记录的答案
    pub async fn list_answers_by_attempt_ids_impl(
        &self,
        attempt_ids: &[i64],
    ) -> Result<Vec<QuizAnswer>> {
        if attempt_ids.is_empty() {
            return Ok(vec![]);
        }

        let answers = QuizAnswers::find()
            .filter(Column::AttemptId.is_in(attempt_ids.to_vec()))
            .order_by_asc(Column::AttemptId)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("批量查询答案失败: {e}")))?;

        Ok(answers.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 写入批改结果并重算作答成绩
    ///
    /// 更新答案、读取全部答案、计算分数、更新作答记录在同一事务内完成。
    pub async fn apply_manual_grade_impl(&self, grade: ManualGrade) -> Result<ManualGradeOutcome> {
        let ManualGrade {
            answer_id,
            attempt_id,
            grade: answer_grade,
            points_awarded,
            feedback,
            graded_by,
            graded_at,
            scoring,
        } = grade;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        // SQLite 由第一条写语句获取写锁，其余后端先锁定作答记录行
        if self.db.get_database_backend() != DbBackend::Sqlite {
            QuizAttempts::find_by_id(attempt_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| {
                    QuizSystemError::database_operation(format!("锁定作答记录失败: {e}"))
                })?;
        }

        let model = ActiveModel {
            id: Set(answer_id),
            is_correct: Set(answer_grade.as_is_correct()),
            points_awarded: Set(points_awarded),
            feedback: Set(feedback),
            graded_by: Set(Some(graded_by)),
            graded_at: Set(Some(to_timestamp(graded_at))),
            ..Default::default()
        };
        let updated_answer = model
            .update(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("更新答案失败: {e}")))?;

        let attempt: QuizAttempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询作答记录失败: {e}")))?
            .ok_or_else(|| {
                QuizSystemError::attempt_not_found(format!("作答记录 {attempt_id} 不存在"))
            })?
            .into_attempt();

        let answers: Vec<QuizAnswer> = QuizAnswers::find()
            .filter(Column::AttemptId.eq(attempt_id))
            .all(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询答案失败: {e}")))?
            .into_iter()
            .map(|m| m.into_answer())
            .collect();

        let state = scoring.recompute_state(&attempt.state, &answers);

        QuizAttempts::update_many()
            .col_expr(AttemptColumn::Score, Expr::value(state.score()))
            .col_expr(AttemptColumn::IsPassed, Expr::value(state.is_passed()))
            .filter(AttemptColumn::Id.eq(attempt_id))
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("更新作答成绩失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(ManualGradeOutcome {
            answer: updated_answer.into_answer(),
            attempt: QuizAttempt { state, ..attempt },
        })
    }
}
