use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 作答记录状态
///
/// 状态只能单向推进：InProgress → PendingGrade → Graded，或 InProgress → Graded。
/// 只有 Graded 状态携带分数，待批改的作答记录不可能有分数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub enum AttemptState {
    // 作答中
    InProgress,
    // 已提交，存在待批改答案
    PendingGrade {
        completed_at: DateTime<Utc>,
        time_spent: i32,
    },
    // 已提交且全部批改完成
    Graded {
        completed_at: DateTime<Utc>,
        time_spent: i32,
        score: i32,
        is_passed: bool,
    },
}

impl AttemptState {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AttemptState::InProgress)
    }

    pub fn is_graded(&self) -> bool {
        matches!(self, AttemptState::Graded { .. })
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AttemptState::InProgress => None,
            AttemptState::PendingGrade { completed_at, .. }
            | AttemptState::Graded { completed_at, .. } => Some(*completed_at),
        }
    }

    pub fn time_spent(&self) -> Option<i32> {
        match self {
            AttemptState::InProgress => None,
            AttemptState::PendingGrade { time_spent, .. }
            | AttemptState::Graded { time_spent, .. } => Some(*time_spent),
        }
    }

    pub fn score(&self) -> Option<i32> {
        match self {
            AttemptState::Graded { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn is_passed(&self) -> Option<bool> {
        match self {
            AttemptState::Graded { is_passed, .. } => Some(*is_passed),
            _ => None,
        }
    }

    /// 从数据库的可空列还原状态
    ///
    /// 只有完成时间、分数、是否通过同时存在才视为已批改。
    pub fn from_columns(
        completed_at: Option<DateTime<Utc>>,
        time_spent: Option<i32>,
        score: Option<i32>,
        is_passed: Option<bool>,
    ) -> Self {
        match (completed_at, score, is_passed) {
            (None, _, _) => AttemptState::InProgress,
            (Some(completed_at), Some(score), Some(is_passed)) => AttemptState::Graded {
                completed_at,
                time_spent: time_spent.unwrap_or(0),
                score,
                is_passed,
            },
            (Some(completed_at), _, _) => AttemptState::PendingGrade {
                completed_at,
                time_spent: time_spent.unwrap_or(0),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct QuizAttempt {
    // 唯一 ID
    pub id: i64,
    // 测验 ID
    pub quiz_id: i64,
    // 作答用户 ID
    pub user_id: i64,
    // 第几次作答（从 1 开始）
    pub attempt_number: i32,
    // 开始时间
    pub started_at: DateTime<Utc>,
    // 状态
    pub state: AttemptState,
}

/// 答案批改结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub enum AnswerGrade {
    Ungraded,  // 待批改
    Correct,   // 正确（得满分）
    Incorrect, // 错误或部分得分
}

impl AnswerGrade {
    pub fn is_graded(self) -> bool {
        self != AnswerGrade::Ungraded
    }

    /// 对应数据库中可空的 is_correct 列
    pub fn as_is_correct(self) -> Option<bool> {
        match self {
            AnswerGrade::Ungraded => None,
            AnswerGrade::Correct => Some(true),
            AnswerGrade::Incorrect => Some(false),
        }
    }

    pub fn from_is_correct(is_correct: Option<bool>) -> Self {
        match is_correct {
            None => AnswerGrade::Ungraded,
            Some(true) => AnswerGrade::Correct,
            Some(false) => AnswerGrade::Incorrect,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attempt.ts")]
pub struct QuizAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    // 文本答案（简答题、问答题）
    pub text_answer: Option<String>,
    // 选择的选项（选择题、判断题）
    pub selected_option_id: Option<i64>,
    pub grade: AnswerGrade,
    pub points_awarded: i32,
    // 教师评语
    pub feedback: Option<String>,
    // 批改教师 ID（仅手动批改）
    pub graded_by: Option<i64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_columns() {
        let now = Utc::now();
        assert_eq!(
            AttemptState::from_columns(None, None, None, None),
            AttemptState::InProgress
        );
        assert_eq!(
            AttemptState::from_columns(Some(now), Some(7), None, None),
            AttemptState::PendingGrade {
                completed_at: now,
                time_spent: 7
            }
        );
        let graded = AttemptState::from_columns(Some(now), Some(7), Some(85), Some(true));
        assert_eq!(graded.score(), Some(85));
        assert_eq!(graded.is_passed(), Some(true));
        assert!(graded.is_graded());
    }

    #[test]
    fn test_pending_state_never_exposes_score() {
        let state = AttemptState::from_columns(Some(Utc::now()), Some(3), Some(50), None);
        assert!(!state.is_graded());
        assert_eq!(state.score(), None);
        assert_eq!(state.time_spent(), Some(3));
    }

    #[test]
    fn test_answer_grade_column_mapping() {
        for grade in [
            AnswerGrade::Ungraded,
            AnswerGrade::Correct,
            AnswerGrade::Incorrect,
        ] {
            assert_eq!(AnswerGrade::from_is_correct(grade.as_is_correct()), grade);
        }
        assert!(!AnswerGrade::Ungraded.is_graded());
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let json = serde_json::to_value(AttemptState::InProgress).unwrap();
        assert_eq!(json["status"], "in_progress");
    }
}
