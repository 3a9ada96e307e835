//! 作答记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub attempt_number: i32,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub score: Option<i32>,
    pub is_passed: Option<bool>,
    pub time_spent: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
    #[sea_orm(has_many = "super::quiz_answers::Entity")]
    Answers,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl Related<super::quiz_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attempt(self) -> crate::models::attempts::entities::QuizAttempt {
        use crate::models::attempts::entities::{AttemptState, QuizAttempt};
        use chrono::{DateTime, Utc};

        QuizAttempt {
            id: self.id,
            quiz_id: self.quiz_id,
            user_id: self.user_id,
            attempt_number: self.attempt_number,
            started_at: DateTime::<Utc>::from_timestamp(self.started_at, 0).unwrap_or_default(),
            state: AttemptState::from_columns(
                self.completed_at
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
                self.time_spent,
                self.score,
                self.is_passed,
            ),
        }
    }
}
