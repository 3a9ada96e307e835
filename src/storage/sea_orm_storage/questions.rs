//! 题目与选项存储操作

use std::collections::HashSet;

use super::SeaOrmStorage;
use crate::entity::question_options::{
    ActiveModel as OptionActiveModel, Column as OptionColumn, Entity as QuestionOptions,
};
use crate::entity::questions::{ActiveModel, Column, Entity as Questions};
use crate::entity::quiz_answers::{Column as AnswerColumn, Entity as QuizAnswers};
use crate::errors::{QuizSystemError, Result};
use crate::models::questions::{
    entities::{Question, QuestionOption, QuestionWithOptions},
    requests::{NewQuestion, QuestionOrder},
};
use crate::storage::answered_question_error;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建题目及其选项
    pub async fn create_question_impl(&self, req: NewQuestion) -> Result<QuestionWithOptions> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            quiz_id: Set(req.quiz_id),
            question_type: Set(req.question_type.to_string()),
            question_text: Set(req.question_text),
            points: Set(req.points),
            order_index: Set(req.order_index),
            explanation: Set(req.explanation),
            created_at: Set(now),
            ..Default::default()
        };

        let question = model
            .insert(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("创建题目失败: {e}")))?;

        let mut options = Vec::with_capacity(req.options.len());
        for (index, option) in req.options.into_iter().enumerate() {
            let option_model = OptionActiveModel {
                question_id: Set(question.id),
                option_text: Set(option.option_text),
                is_correct: Set(option.is_correct),
                order_index: Set(index as i32),
                ..Default::default()
            };

            let inserted = option_model
                .insert(&txn)
                .await
                .map_err(|e| QuizSystemError::database_operation(format!("创建选项失败: {e}")))?;
            options.push(inserted.into_option());
        }

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(QuestionWithOptions {
            question: question.into_question()?,
            options,
        })
    }

    /// 通过 ID 获取题目
    pub async fn get_question_by_id_impl(&self, question_id: i64) -> Result<Option<Question>> {
        let result = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询题目失败: {e}")))?;

        result.map(|m| m.into_question()).transpose()
    }

    /// 列出测验的全部题目
    pub async fn list_questions_by_quiz_impl(&self, quiz_id: i64) -> Result<Vec<Question>> {
        let questions = Questions::find()
            .filter(Column::QuizId.eq(quiz_id))
            .order_by_asc(Column::OrderIndex)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询题目列表失败: {e}")))?;

        questions.into_iter().map(|m| m.into_question()).collect()
    }

    /// 批量获取选项
    pub async fn list_options_by_question_ids_impl(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        let options = QuestionOptions::find()
            .filter(OptionColumn::QuestionId.is_in(question_ids.to_vec()))
            .order_by_asc(OptionColumn::QuestionId)
            .order_by_asc(OptionColumn::OrderIndex)
            .order_by_asc(OptionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询选项失败: {e}")))?;

        Ok(options.into_iter().map(|m| m.into_option()).collect())
    }

    /// 删除题目及其选项
    pub async fn delete_question_impl(&self, quiz_id: i64, question_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let owned = Questions::find_by_id(question_id)
            .filter(Column::QuizId.eq(quiz_id))
            .one(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询题目失败: {e}")))?;
        if owned.is_none() {
            return Ok(false);
        }

        // 已被作答的题目不能删除
        let answered = QuizAnswers::find()
            .filter(AnswerColumn::QuestionId.eq(question_id))
            .count(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询答案失败: {e}")))?;
        if answered > 0 {
            return Err(answered_question_error(question_id));
        }

        QuestionOptions::delete_many()
            .filter(OptionColumn::QuestionId.eq(question_id))
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("删除选项失败: {e}")))?;

        let result = Questions::delete_many()
            .filter(Column::Id.eq(question_id))
            .filter(Column::QuizId.eq(quiz_id))
            .exec(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("删除题目失败: {e}")))?;

        // 题目不属于该测验时不提交，选项删除随事务回滚
        if result.rows_affected == 0 {
            return Ok(false);
        }

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 批量调整题目顺序
    pub async fn reorder_questions_impl(
        &self,
        quiz_id: i64,
        orders: &[QuestionOrder],
    ) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let existing: HashSet<i64> = Questions::find()
            .filter(Column::QuizId.eq(quiz_id))
            .select_only()
            .column(Column::Id)
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("查询题目列表失败: {e}")))?
            .into_iter()
            .collect();

        // 先整体校验，任何一项不合法都不修改
        if let Some(missing) = orders.iter().find(|o| !existing.contains(&o.question_id)) {
            return Err(QuizSystemError::question_not_found(format!(
                "题目 {} 不属于测验 {quiz_id}",
                missing.question_id
            )));
        }

        for order in orders {
            let model = ActiveModel {
                id: Set(order.question_id),
                order_index: Set(order.order_index),
                ..Default::default()
            };
            model
                .update(&txn)
                .await
                .map_err(|e| QuizSystemError::database_operation(format!("更新题目顺序失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| QuizSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }
}
