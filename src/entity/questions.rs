//! 题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub question_type: String,
    #[sea_orm(column_type = "Text")]
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub explanation: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
    #[sea_orm(has_many = "super::question_options::Entity")]
    Options,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl Related<super::question_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(
        self,
    ) -> crate::errors::Result<crate::models::questions::entities::Question> {
        use crate::errors::QuizSystemError;
        use crate::models::questions::entities::Question;
        use chrono::{DateTime, Utc};

        let question_type = self.question_type.parse().map_err(|e: String| {
            QuizSystemError::serialization(format!("题目 {} 类型无效: {e}", self.id))
        })?;

        Ok(Question {
            id: self.id,
            quiz_id: self.quiz_id,
            question_type,
            question_text: self.question_text,
            points: self.points,
            order_index: self.order_index,
            explanation: self.explanation,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}
