//! 作答流程：开始作答与提交

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info};

use super::QuizEngine;
use super::grading::classify_answer;
use super::scoring::{AttemptScore, minutes_between};
use crate::errors::{QuizSystemError, Result};
use crate::models::attempts::{
    entities::{AttemptState, QuizAttempt},
    requests::{AnswerSubmission, AttemptCompletion, NewQuizAnswer, NewQuizAttempt},
    responses::AttemptWithAnswers,
};
use crate::models::questions::entities::QuestionWithOptions;

pub async fn start_attempt(engine: &QuizEngine, quiz_id: i64, user_id: i64) -> Result<QuizAttempt> {
    let quiz = engine.require_quiz(quiz_id).await?;
    if !quiz.is_published {
        return Err(QuizSystemError::quiz_not_published(format!(
            "测验 {quiz_id} 尚未发布"
        )));
    }

    let attempt_count = engine.storage().count_attempts(quiz_id, user_id).await?;
    if !quiz.allows_another_attempt(attempt_count) {
        return Err(QuizSystemError::max_attempts_reached(format!(
            "已作答 {attempt_count} 次，达到最大作答次数"
        )));
    }

    let attempt = engine
        .storage()
        .create_attempt(NewQuizAttempt {
            quiz_id,
            user_id,
            attempt_number: attempt_count as i32 + 1,
            started_at: Utc::now(),
        })
        .await?;

    info!(
        "用户 {} 开始作答测验 {}，第 {} 次",
        user_id, quiz_id, attempt.attempt_number
    );
    Ok(attempt)
}

/// 根据判分结果得出提交后的状态
///
/// 存在待批改答案时不计算分数。
pub fn completion_state(
    answers: &[NewQuizAnswer],
    questions: &HashMap<i64, &QuestionWithOptions>,
    passing_score: i32,
    completed_at: chrono::DateTime<Utc>,
    time_spent: i32,
) -> AttemptState {
    if answers.iter().any(|a| !a.grade.is_graded()) {
        return AttemptState::PendingGrade {
            completed_at,
            time_spent,
        };
    }

    let total_points = answers
        .iter()
        .filter_map(|a| questions.get(&a.question_id))
        .map(|q| q.question.points)
        .sum();
    let earned_points = answers.iter().map(|a| a.points_awarded).sum();
    let result = AttemptScore::compute(earned_points, total_points, passing_score);

    AttemptState::Graded {
        completed_at,
        time_spent,
        score: result.score,
        is_passed: result.is_passed,
    }
}

pub async fn submit_attempt(
    engine: &QuizEngine,
    attempt_id: i64,
    user_id: i64,
    submissions: Vec<AnswerSubmission>,
) -> Result<AttemptWithAnswers> {
    let attempt = engine.require_attempt(attempt_id).await?;

    if attempt.user_id != user_id {
        return Err(QuizSystemError::unauthorized_access(format!(
            "作答记录 {attempt_id} 不属于当前用户"
        )));
    }

    if !attempt.state.is_in_progress() {
        return Err(QuizSystemError::attempt_already_complete(format!(
            "作答记录 {attempt_id} 已提交"
        )));
    }

    let quiz = engine.require_quiz(attempt.quiz_id).await?;

    let now = Utc::now();
    let elapsed_seconds = (now - attempt.started_at).num_seconds();
    if quiz.is_time_exceeded(elapsed_seconds) {
        return Err(QuizSystemError::time_limit_exceeded(format!(
            "已用时 {elapsed_seconds} 秒，超过时限 {} 分钟",
            quiz.time_limit.unwrap_or_default()
        )));
    }

    let questions = engine.load_questions(quiz.id).await?;
    let by_id: HashMap<i64, &QuestionWithOptions> =
        questions.iter().map(|q| (q.question.id, q)).collect();

    let mut seen = HashSet::with_capacity(submissions.len());
    let mut answers = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let question = by_id.get(&submission.question_id).ok_or_else(|| {
            QuizSystemError::question_not_found(format!(
                "题目 {} 不属于测验 {}",
                submission.question_id, quiz.id
            ))
        })?;

        if !seen.insert(submission.question_id) {
            return Err(QuizSystemError::validation(format!(
                "题目 {} 重复作答",
                submission.question_id
            )));
        }

        answers.push(classify_answer(question, submission));
    }

    let state = completion_state(
        &answers,
        &by_id,
        quiz.passing_score,
        now,
        minutes_between(attempt.started_at, now),
    );
    debug!("作答记录 {} 提交后状态: {:?}", attempt_id, state);

    let completed = engine
        .storage()
        .complete_attempt(AttemptCompletion {
            attempt_id,
            state,
            answers,
        })
        .await?
        .ok_or_else(|| {
            QuizSystemError::attempt_already_complete(format!("作答记录 {attempt_id} 已提交"))
        })?;

    info!(
        "用户 {} 提交作答记录 {}，共 {} 道题",
        user_id,
        attempt_id,
        completed.answers.len()
    );
    Ok(completed)
}
