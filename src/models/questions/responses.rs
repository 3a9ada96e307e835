use serde::Serialize;
use ts_rs::TS;

use super::entities::{QuestionType, QuestionWithOptions};

/// 学生作答视角的选项（不含正确答案）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct PublicOption {
    pub id: i64,
    pub option_text: String,
}

/// 学生作答视角的题目（不含解析和正确答案）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct PublicQuestion {
    pub id: i64,
    pub question_type: QuestionType,
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    pub options: Vec<PublicOption>,
}

impl From<QuestionWithOptions> for PublicQuestion {
    fn from(value: QuestionWithOptions) -> Self {
        let QuestionWithOptions { question, options } = value;
        PublicQuestion {
            id: question.id,
            question_type: question.question_type,
            question_text: question.question_text,
            points: question.points,
            order_index: question.order_index,
            options: options
                .into_iter()
                .map(|o| PublicOption {
                    id: o.id,
                    option_text: o.option_text,
                })
                .collect(),
        }
    }
}
