//! 判分与教师批改

use tracing::info;

use super::QuizEngine;
use super::scoring::ScoringContext;
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    attempts::{
        entities::{AnswerGrade, QuizAnswer},
        requests::{AnswerSubmission, NewQuizAnswer},
    },
    grading::requests::ManualGrade,
    questions::entities::{Question, QuestionWithOptions},
};

/// 对单个提交的答案分类并判分
///
/// 客观题只有选中该题的正确选项才算正确，未选择或选项不属于该题一律判错；
/// 简答题和问答题保持待批改，得分为 0。
pub fn classify_answer(
    question: &QuestionWithOptions,
    submission: AnswerSubmission,
) -> NewQuizAnswer {
    let (grade, points_awarded) = if question.question.question_type.supports_auto_grading() {
        let is_correct = submission.selected_option_id.is_some_and(|selected| {
            question
                .options
                .iter()
                .any(|o| o.id == selected && o.is_correct)
        });

        if is_correct {
            (AnswerGrade::Correct, question.question.points)
        } else {
            (AnswerGrade::Incorrect, 0)
        }
    } else {
        (AnswerGrade::Ungraded, 0)
    };

    NewQuizAnswer {
        question_id: submission.question_id,
        text_answer: submission.text_answer,
        selected_option_id: submission.selected_option_id,
        grade,
        points_awarded,
    }
}

/// 校验教师给分并得出批改结果
pub fn manual_grade_for(question: &Question, points_awarded: i32) -> Result<AnswerGrade> {
    if !question.question_type.accepts_manual_grade() {
        return Err(QuizSystemError::cannot_grade_auto_graded(format!(
            "题目 {} 为自动判分题，不能手动批改",
            question.id
        )));
    }

    if points_awarded < 0 || points_awarded > question.points {
        return Err(QuizSystemError::invalid_points_awarded(format!(
            "给分 {points_awarded} 超出范围 0..={}",
            question.points
        )));
    }

    Ok(if points_awarded == question.points {
        AnswerGrade::Correct
    } else {
        AnswerGrade::Incorrect
    })
}

pub async fn grade_essay_answer(
    engine: &QuizEngine,
    answer_id: i64,
    instructor_id: i64,
    points_awarded: i32,
    feedback: Option<String>,
) -> Result<QuizAnswer> {
    let storage = engine.storage();

    let answer = storage
        .get_answer_by_id(answer_id)
        .await?
        .ok_or_else(|| QuizSystemError::answer_not_found(format!("答案 {answer_id} 不存在")))?;

    let question = storage
        .get_question_by_id(answer.question_id)
        .await?
        .ok_or_else(|| {
            QuizSystemError::question_not_found(format!("题目 {} 不存在", answer.question_id))
        })?;

    let grade = manual_grade_for(&question, points_awarded)?;

    let attempt = engine.require_attempt(answer.attempt_id).await?;
    let quiz = engine.require_quiz(attempt.quiz_id).await?;
    let questions = storage.list_questions_by_quiz(quiz.id).await?;

    let outcome = storage
        .apply_manual_grade(ManualGrade {
            answer_id,
            attempt_id: attempt.id,
            grade,
            points_awarded,
            feedback,
            graded_by: instructor_id,
            graded_at: chrono::Utc::now(),
            scoring: ScoringContext::new(quiz.passing_score, &questions),
        })
        .await?;

    info!(
        "答案 {} 已由 {} 批改，得分 {}，作答记录 {} 是否批改完成: {}",
        answer_id,
        instructor_id,
        points_awarded,
        outcome.attempt.id,
        outcome.attempt.state.is_graded()
    );

    Ok(outcome.answer)
}
