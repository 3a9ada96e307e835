use serde::Serialize;
use ts_rs::TS;

use super::entities::Quiz;
use crate::models::questions::{entities::QuestionWithOptions, responses::PublicQuestion};

/// 测验详情（教师视角）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithOptions>,
}

/// 测验作答视图（学生视角）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizForTakingResponse {
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}
