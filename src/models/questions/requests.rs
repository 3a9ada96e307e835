use serde::Deserialize;
use ts_rs::TS;

use super::entities::QuestionType;

/// 创建题目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct CreateQuestionRequest {
    pub question_type: QuestionType,
    pub question_text: String,
    pub points: i32,
    pub explanation: Option<String>,
    #[serde(default)]
    pub options: Vec<CreateOptionRequest>,
}

/// 创建选项请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct CreateOptionRequest {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// 调整题目顺序请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct ReorderQuestionsRequest {
    pub orders: Vec<QuestionOrder>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct QuestionOrder {
    pub question_id: i64,
    pub order_index: i32,
}

// 用于存储层的内部参数（已通过校验）
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_id: i64,
    pub question_type: QuestionType,
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    pub explanation: Option<String>,
    pub options: Vec<CreateOptionRequest>,
}
