//! 题目选项实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "question_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_id: i64,
    #[sea_orm(column_type = "Text")]
    pub option_text: String,
    pub is_correct: bool,
    pub order_index: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Question,
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_option(self) -> crate::models::questions::entities::QuestionOption {
        crate::models::questions::entities::QuestionOption {
            id: self.id,
            question_id: self.question_id,
            option_text: self.option_text,
            is_correct: self.is_correct,
            order_index: self.order_index,
        }
    }
}
