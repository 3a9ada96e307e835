//! 查询与统计

use std::collections::HashSet;

use super::QuizEngine;
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    attempts::{
        entities::{AnswerGrade, QuizAnswer, QuizAttempt},
        responses::{AttemptDetailResponse, CorrectOptions},
    },
    grading::responses::QuizStatistics,
    users::entities::CurrentUser,
};

/// 保留两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
}

/// 根据作答记录计算测验统计
pub fn summarize_attempts(quiz_id: i64, attempts: &[QuizAttempt]) -> QuizStatistics {
    let completed: Vec<&QuizAttempt> = attempts
        .iter()
        .filter(|a| !a.state.is_in_progress())
        .collect();
    let scores: Vec<i32> = attempts.iter().filter_map(|a| a.state.score()).collect();
    let passed = attempts
        .iter()
        .filter(|a| a.state.is_passed() == Some(true))
        .count();
    let time_spent: Vec<i32> = completed.iter().filter_map(|a| a.state.time_spent()).collect();

    let pass_rate = if scores.is_empty() {
        0.0
    } else {
        passed as f64 / scores.len() as f64 * 100.0
    };

    QuizStatistics {
        quiz_id,
        total_attempts: attempts.len() as i64,
        completed_attempts: completed.len() as i64,
        average_score: round2(mean(&scores)),
        average_time_spent: round2(mean(&time_spent)),
        pass_rate: round2(pass_rate),
    }
}

pub async fn get_quiz_statistics(engine: &QuizEngine, quiz_id: i64) -> Result<QuizStatistics> {
    engine.require_quiz(quiz_id).await?;
    let attempts = engine.storage().list_attempts_by_quiz(quiz_id).await?;
    Ok(summarize_attempts(quiz_id, &attempts))
}

/// 列出测验中所有待教师批改的答案
pub async fn get_pending_grading(engine: &QuizEngine, quiz_id: i64) -> Result<Vec<QuizAnswer>> {
    engine.require_quiz(quiz_id).await?;

    let manual_questions: HashSet<i64> = engine
        .storage()
        .list_questions_by_quiz(quiz_id)
        .await?
        .into_iter()
        .filter(|q| q.question_type.accepts_manual_grade())
        .map(|q| q.id)
        .collect();
    if manual_questions.is_empty() {
        return Ok(vec![]);
    }

    let attempt_ids: Vec<i64> = engine
        .storage()
        .list_attempts_by_quiz(quiz_id)
        .await?
        .into_iter()
        .filter(|a| !a.state.is_in_progress())
        .map(|a| a.id)
        .collect();

    let answers = engine
        .storage()
        .list_answers_by_attempt_ids(&attempt_ids)
        .await?;

    Ok(answers
        .into_iter()
        .filter(|a| a.grade == AnswerGrade::Ungraded && manual_questions.contains(&a.question_id))
        .collect())
}

/// 查看作答详情
///
/// 作答者本人和教师可见；作答者只有在测验允许且已提交时才能看到正确选项。
pub async fn get_attempt(
    engine: &QuizEngine,
    attempt_id: i64,
    viewer: &CurrentUser,
) -> Result<AttemptDetailResponse> {
    let attempt = engine.require_attempt(attempt_id).await?;

    let is_owner = attempt.user_id == viewer.id;
    if !is_owner && !viewer.is_instructor() {
        return Err(QuizSystemError::unauthorized_access(format!(
            "无权查看作答记录 {attempt_id}"
        )));
    }

    let quiz = engine.require_quiz(attempt.quiz_id).await?;
    let answers = engine.storage().list_answers_by_attempt(attempt_id).await?;

    let reveal = viewer.is_instructor()
        || (quiz.show_correct_answers && !attempt.state.is_in_progress());

    let correct_options = if reveal {
        let question_ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        let options = engine
            .storage()
            .list_options_by_question_ids(&question_ids)
            .await?;

        let mut grouped: Vec<CorrectOptions> = Vec::new();
        for option in options.into_iter().filter(|o| o.is_correct) {
            match grouped.last_mut() {
                Some(last) if last.question_id == option.question_id => {
                    last.option_ids.push(option.id)
                }
                _ => grouped.push(CorrectOptions {
                    question_id: option.question_id,
                    option_ids: vec![option.id],
                }),
            }
        }
        Some(grouped)
    } else {
        None
    };

    Ok(AttemptDetailResponse {
        attempt,
        answers,
        correct_options,
    })
}

pub async fn list_user_attempts(
    engine: &QuizEngine,
    quiz_id: i64,
    user_id: i64,
) -> Result<Vec<QuizAttempt>> {
    engine.require_quiz(quiz_id).await?;
    engine.storage().list_user_attempts(quiz_id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempts::entities::AttemptState;
    use chrono::Utc;

    fn attempt(id: i64, state: AttemptState) -> QuizAttempt {
        QuizAttempt {
            id,
            quiz_id: 1,
            user_id: id,
            attempt_number: 1,
            started_at: Utc::now(),
            state,
        }
    }

    fn graded(score: i32, is_passed: bool, time_spent: i32) -> AttemptState {
        AttemptState::Graded {
            completed_at: Utc::now(),
            time_spent,
            score,
            is_passed,
        }
    }

    #[test]
    fn test_statistics_empty() {
        let stats = summarize_attempts(1, &[]);
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.completed_attempts, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.average_time_spent, 0.0);
        assert_eq!(stats.pass_rate, 0.0);
    }

    #[test]
    fn test_statistics_mixed_states() {
        let attempts = vec![
            attempt(1, graded(90, true, 10)),
            attempt(2, graded(50, false, 20)),
            attempt(3, graded(71, true, 5)),
            attempt(
                4,
                AttemptState::PendingGrade {
                    completed_at: Utc::now(),
                    time_spent: 9,
                },
            ),
            attempt(5, AttemptState::InProgress),
        ];

        let stats = summarize_attempts(1, &attempts);
        assert_eq!(stats.total_attempts, 5);
        assert_eq!(stats.completed_attempts, 4);
        // 待批改的作答不计入平均分和通过率
        assert_eq!(stats.average_score, 70.33);
        assert_eq!(stats.pass_rate, 66.67);
        assert_eq!(stats.average_time_spent, 11.0);
    }
}
