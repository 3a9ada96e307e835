//! 测验实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub lesson_id: Option<i64>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub passing_score: i32,
    pub time_limit: Option<i32>,
    pub max_attempts: Option<i32>,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub show_correct_answers: bool,
    pub is_published: bool,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::questions::Entity")]
    Questions,
    #[sea_orm(has_many = "super::quiz_attempts::Entity")]
    Attempts,
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::quiz_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_quiz(self) -> crate::models::quizzes::entities::Quiz {
        use crate::models::quizzes::entities::Quiz;
        use chrono::{DateTime, Utc};

        Quiz {
            id: self.id,
            course_id: self.course_id,
            lesson_id: self.lesson_id,
            title: self.title,
            description: self.description,
            passing_score: self.passing_score,
            time_limit: self.time_limit,
            max_attempts: self.max_attempts,
            shuffle_questions: self.shuffle_questions,
            shuffle_options: self.shuffle_options,
            show_correct_answers: self.show_correct_answers,
            is_published: self.is_published,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
