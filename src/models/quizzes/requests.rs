use serde::Deserialize;
use ts_rs::TS;

/// 创建测验请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuizRequest {
    pub course_id: i64,
    pub lesson_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub time_limit: Option<i32>,   // 分钟
    pub max_attempts: Option<i32>, // 不填表示不限次数
    pub shuffle_questions: Option<bool>,
    pub shuffle_options: Option<bool>,
    pub show_correct_answers: Option<bool>,
    pub is_published: Option<bool>,
}

/// 更新测验请求（发布/取消发布也通过此请求完成）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub passing_score: Option<i32>,
    pub time_limit: Option<i32>,
    pub max_attempts: Option<i32>,
    pub shuffle_questions: Option<bool>,
    pub shuffle_options: Option<bool>,
    pub show_correct_answers: Option<bool>,
    pub is_published: Option<bool>,
}
