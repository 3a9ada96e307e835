use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{AnswerGrade, AttemptState};

/// 提交作答请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
}

/// 单题答案
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub text_answer: Option<String>,
    pub selected_option_id: Option<i64>,
}

// 用于存储层的内部参数
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub quiz_id: i64,
    pub user_id: i64,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
}

// 提交时生成的答案（已完成自动判分）
#[derive(Debug, Clone)]
pub struct NewQuizAnswer {
    pub question_id: i64,
    pub text_answer: Option<String>,
    pub selected_option_id: Option<i64>,
    pub grade: AnswerGrade,
    pub points_awarded: i32,
}

// 完成作答：仅当作答记录仍处于作答中时才会写入
#[derive(Debug, Clone)]
pub struct AttemptCompletion {
    pub attempt_id: i64,
    pub state: AttemptState,
    pub answers: Vec<NewQuizAnswer>,
}
