use serde::Serialize;
use ts_rs::TS;

use super::entities::{QuizAnswer, QuizAttempt};

/// 作答记录及其答案
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptWithAnswers {
    pub attempt: QuizAttempt,
    pub answers: Vec<QuizAnswer>,
}

/// 某道题的正确选项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct CorrectOptions {
    pub question_id: i64,
    pub option_ids: Vec<i64>,
}

/// 作答详情
///
/// `correct_options` 只在测验允许展示答案且作答已提交时返回给作答者，教师始终可见。
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct AttemptDetailResponse {
    pub attempt: QuizAttempt,
    pub answers: Vec<QuizAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_options: Option<Vec<CorrectOptions>>,
}
