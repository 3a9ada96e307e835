//! 分数计算
//!
//! 纯函数，不访问存储。提交作答与教师批改后的重算共用同一套规则。

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::attempts::entities::{AttemptState, QuizAnswer};
use crate::models::questions::entities::Question;

/// 百分制得分，四舍五入；总分为 0 时得 0 分
pub fn percentage(earned_points: i32, total_points: i32) -> i32 {
    if total_points <= 0 {
        return 0;
    }
    (f64::from(earned_points) / f64::from(total_points) * 100.0).round() as i32
}

/// 作答所用分钟数，四舍五入
pub fn minutes_between(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let seconds = (now - started_at).num_seconds().max(0);
    (seconds as f64 / 60.0).round() as i32
}

/// 一次作答的最终成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptScore {
    pub total_points: i32,
    pub earned_points: i32,
    pub score: i32,
    pub is_passed: bool,
}

impl AttemptScore {
    pub fn compute(earned_points: i32, total_points: i32, passing_score: i32) -> Self {
        let score = percentage(earned_points, total_points);
        Self {
            total_points,
            earned_points,
            score,
            // 及格线包含等于
            is_passed: score >= passing_score,
        }
    }
}

/// 计分上下文：测验的及格线与各题分值
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub passing_score: i32,
    pub question_points: HashMap<i64, i32>,
}

impl ScoringContext {
    pub fn new(passing_score: i32, questions: &[Question]) -> Self {
        Self {
            passing_score,
            question_points: questions.iter().map(|q| (q.id, q.points)).collect(),
        }
    }

    fn points_of(&self, question_id: i64) -> i32 {
        self.question_points.get(&question_id).copied().unwrap_or(0)
    }

    /// 全部答案都已批改时计算成绩，否则返回 None
    ///
    /// 总分只统计已作答题目的分值。
    pub fn evaluate(&self, answers: &[QuizAnswer]) -> Option<AttemptScore> {
        if answers.iter().any(|a| !a.grade.is_graded()) {
            return None;
        }

        let total_points = answers.iter().map(|a| self.points_of(a.question_id)).sum();
        let earned_points = answers.iter().map(|a| a.points_awarded).sum();
        Some(AttemptScore::compute(
            earned_points,
            total_points,
            self.passing_score,
        ))
    }

    /// 根据当前全部答案重新推导已提交作答记录的状态
    ///
    /// 作答中的记录保持不变。
    pub fn recompute_state(&self, current: &AttemptState, answers: &[QuizAnswer]) -> AttemptState {
        let (completed_at, time_spent) = match current {
            AttemptState::InProgress => return AttemptState::InProgress,
            AttemptState::PendingGrade {
                completed_at,
                time_spent,
            }
            | AttemptState::Graded {
                completed_at,
                time_spent,
                ..
            } => (*completed_at, *time_spent),
        };

        match self.evaluate(answers) {
            Some(result) => AttemptState::Graded {
                completed_at,
                time_spent,
                score: result.score,
                is_passed: result.is_passed,
            },
            None => AttemptState::PendingGrade {
                completed_at,
                time_spent,
            },
        }
    }
}
