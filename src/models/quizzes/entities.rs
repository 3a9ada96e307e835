use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct Quiz {
    // 唯一 ID
    pub id: i64,
    // 所属课程 ID
    pub course_id: i64,
    // 所属课时 ID
    pub lesson_id: Option<i64>,
    // 测验标题
    pub title: String,
    // 测验说明
    pub description: Option<String>,
    // 及格分数（百分制）
    pub passing_score: i32,
    // 作答时限（分钟）
    pub time_limit: Option<i32>,
    // 最大作答次数
    pub max_attempts: Option<i32>,
    // 是否打乱题目顺序
    pub shuffle_questions: bool,
    // 是否打乱选项顺序
    pub shuffle_options: bool,
    // 作答完成后是否展示正确答案
    pub show_correct_answers: bool,
    // 是否已发布
    pub is_published: bool,
    // 创建者 ID
    pub created_by: i64,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Quiz {
    /// 该用户已作答 `attempt_count` 次后是否还能再开始作答
    pub fn allows_another_attempt(&self, attempt_count: i64) -> bool {
        match self.max_attempts {
            Some(max) => attempt_count < i64::from(max),
            None => true,
        }
    }

    /// 已用时间（秒）是否超出作答时限
    pub fn is_time_exceeded(&self, elapsed_seconds: i64) -> bool {
        match self.time_limit {
            Some(limit) => elapsed_seconds > i64::from(limit) * 60,
            None => false,
        }
    }
}
