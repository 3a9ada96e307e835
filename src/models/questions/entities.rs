use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 题目类型
///
/// 判分能力完全由类型决定：选择题与判断题自动判分，问答题需要教师批改，
/// 简答题暂不做自动匹配，提交后同样保持待批改。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub enum QuestionType {
    MultipleChoice, // 单选题
    TrueFalse,      // 判断题
    ShortAnswer,    // 简答题
    Essay,          // 问答题
}

impl QuestionType {
    pub const MULTIPLE_CHOICE: &'static str = "multiple_choice";
    pub const TRUE_FALSE: &'static str = "true_false";
    pub const SHORT_ANSWER: &'static str = "short_answer";
    pub const ESSAY: &'static str = "essay";

    /// 是否支持自动判分
    pub fn supports_auto_grading(self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }

    /// 是否必须由教师批改
    pub fn requires_manual_grading(self) -> bool {
        matches!(self, QuestionType::Essay)
    }

    /// 是否接受教师手动给分
    ///
    /// 简答题不属于 `requires_manual_grading`，但提交后同样处于待批改状态，
    /// 因此所有不能自动判分的题目都允许手动给分。
    pub fn accepts_manual_grade(self) -> bool {
        !self.supports_auto_grading()
    }

    /// 是否需要选项
    pub fn has_options(self) -> bool {
        self.supports_auto_grading()
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "{}", QuestionType::MULTIPLE_CHOICE),
            QuestionType::TrueFalse => write!(f, "{}", QuestionType::TRUE_FALSE),
            QuestionType::ShortAnswer => write!(f, "{}", QuestionType::SHORT_ANSWER),
            QuestionType::Essay => write!(f, "{}", QuestionType::ESSAY),
        }
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            QuestionType::MULTIPLE_CHOICE => Ok(QuestionType::MultipleChoice),
            QuestionType::TRUE_FALSE => Ok(QuestionType::TrueFalse),
            QuestionType::SHORT_ANSWER => Ok(QuestionType::ShortAnswer),
            QuestionType::ESSAY => Ok(QuestionType::Essay),
            _ => Err(format!("Invalid question type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct Question {
    // 唯一 ID
    pub id: i64,
    // 所属测验 ID
    pub quiz_id: i64,
    // 题目类型
    pub question_type: QuestionType,
    // 题干
    pub question_text: String,
    // 分值
    pub points: i32,
    // 排序序号
    pub order_index: i32,
    // 答案解析
    pub explanation: Option<String>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
    pub order_index: i32,
}

/// 题目及其选项（教师视角，包含正确答案）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/question.ts")]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    #[ts(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
}
