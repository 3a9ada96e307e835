use serde::Serialize;
use ts_rs::TS;

use crate::models::attempts::entities::{QuizAnswer, QuizAttempt};

/// 测验统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct QuizStatistics {
    pub quiz_id: i64,
    // 全部作答记录数
    pub total_attempts: i64,
    // 已提交的作答记录数（含待批改）
    pub completed_attempts: i64,
    // 已批改作答记录的平均分
    pub average_score: f64,
    // 已提交作答记录的平均用时（分钟）
    pub average_time_spent: f64,
    // 已批改作答记录中的通过率（百分比）
    pub pass_rate: f64,
}

/// 待批改答案列表
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct PendingGradingResponse {
    pub quiz_id: i64,
    pub items: Vec<QuizAnswer>,
}

// 存储层批改结果
#[derive(Debug, Clone)]
pub struct ManualGradeOutcome {
    pub answer: QuizAnswer,
    pub attempt: QuizAttempt,
}
