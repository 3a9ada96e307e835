use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use crate::engine::scoring::ScoringContext;
use crate::models::attempts::entities::AnswerGrade;

/// 教师批改答案请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grading.ts")]
pub struct GradeAnswerRequest {
    pub points_awarded: i32,
    pub feedback: Option<String>,
}

// 用于存储层的内部参数：批改单个答案并在同一事务中重算作答成绩
#[derive(Debug, Clone)]
pub struct ManualGrade {
    pub answer_id: i64,
    pub attempt_id: i64,
    pub grade: AnswerGrade,
    pub points_awarded: i32,
    pub feedback: Option<String>,
    pub graded_by: i64,
    pub graded_at: DateTime<Utc>,
    pub scoring: ScoringContext,
}
