//! 答案实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_answer: Option<String>,
    pub selected_option_id: Option<i64>,
    // NULL 表示待批改
    pub is_correct: Option<bool>,
    pub points_awarded: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz_attempts::Entity",
        from = "Column::AttemptId",
        to = "super::quiz_attempts::Column::Id"
    )]
    Attempt,
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Question,
}

impl Related<super::quiz_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempt.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_answer(self) -> crate::models::attempts::entities::QuizAnswer {
        use crate::models::attempts::entities::{AnswerGrade, QuizAnswer};
        use chrono::{DateTime, Utc};

        QuizAnswer {
            id: self.id,
            attempt_id: self.attempt_id,
            question_id: self.question_id,
            text_answer: self.text_answer,
            selected_option_id: self.selected_option_id,
            grade: AnswerGrade::from_is_correct(self.is_correct),
            points_awarded: self.points_awarded,
            feedback: self.feedback,
            graded_by: self.graded_by,
            graded_at: self
                .graded_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
