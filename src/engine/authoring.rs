//! 出题与测验管理

use rand::seq::SliceRandom;
use tracing::info;

use super::QuizEngine;
use crate::errors::{QuizSystemError, Result};
use crate::models::{
    questions::{
        entities::{QuestionType, QuestionWithOptions},
        requests::{CreateQuestionRequest, NewQuestion, QuestionOrder},
        responses::PublicQuestion,
    },
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, UpdateQuizRequest},
        responses::{QuizDetailResponse, QuizForTakingResponse},
    },
};

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(QuizSystemError::validation("测验标题不能为空"));
    }
    Ok(())
}

fn validate_passing_score(passing_score: i32) -> Result<()> {
    if !(0..=100).contains(&passing_score) {
        return Err(QuizSystemError::validation(format!(
            "及格分数 {passing_score} 必须在 0 到 100 之间"
        )));
    }
    Ok(())
}

fn validate_positive(field: &str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) if v <= 0 => Err(QuizSystemError::validation(format!(
            "{field} 必须大于 0，当前为 {v}"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_create_quiz(req: &CreateQuizRequest) -> Result<()> {
    validate_title(&req.title)?;
    validate_passing_score(req.passing_score)?;
    validate_positive("time_limit", req.time_limit)?;
    validate_positive("max_attempts", req.max_attempts)
}

pub fn validate_update_quiz(req: &UpdateQuizRequest) -> Result<()> {
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(passing_score) = req.passing_score {
        validate_passing_score(passing_score)?;
    }
    validate_positive("time_limit", req.time_limit)?;
    validate_positive("max_attempts", req.max_attempts)
}

/// 校验题目，任何错误都在写入前返回
pub fn validate_question(req: &CreateQuestionRequest) -> Result<()> {
    if req.question_text.trim().is_empty() {
        return Err(QuizSystemError::validation("题干不能为空"));
    }
    if req.points < 0 {
        return Err(QuizSystemError::validation(format!(
            "分值不能为负数，当前为 {}",
            req.points
        )));
    }

    if !req.question_type.has_options() {
        if !req.options.is_empty() {
            return Err(QuizSystemError::validation(format!(
                "{} 类型的题目不能设置选项",
                req.question_type
            )));
        }
        return Ok(());
    }

    if req.options.is_empty() {
        return Err(QuizSystemError::validation("选择题和判断题至少需要一个选项"));
    }
    if !req.options.iter().any(|o| o.is_correct) {
        return Err(QuizSystemError::validation("至少需要一个正确选项"));
    }
    if req.question_type == QuestionType::TrueFalse && req.options.len() != 2 {
        return Err(QuizSystemError::validation(format!(
            "判断题必须恰好有两个选项，当前为 {}",
            req.options.len()
        )));
    }
    if req.options.iter().any(|o| o.option_text.trim().is_empty()) {
        return Err(QuizSystemError::validation("选项内容不能为空"));
    }

    Ok(())
}

pub async fn create_quiz(
    engine: &QuizEngine,
    created_by: i64,
    req: CreateQuizRequest,
) -> Result<Quiz> {
    validate_create_quiz(&req)?;

    let quiz = engine.storage().create_quiz(created_by, req).await?;
    info!("用户 {} 创建测验 {}", created_by, quiz.id);
    Ok(quiz)
}

pub async fn update_quiz(
    engine: &QuizEngine,
    quiz_id: i64,
    req: UpdateQuizRequest,
) -> Result<Quiz> {
    validate_update_quiz(&req)?;

    engine
        .storage()
        .update_quiz(quiz_id, req)
        .await?
        .ok_or_else(|| QuizSystemError::quiz_not_found(format!("测验 {quiz_id} 不存在")))
}

pub async fn get_quiz_detail(engine: &QuizEngine, quiz_id: i64) -> Result<QuizDetailResponse> {
    let quiz = engine.require_quiz(quiz_id).await?;
    let questions = engine.load_questions(quiz_id).await?;
    Ok(QuizDetailResponse { quiz, questions })
}

/// 学生作答视图：隐藏正确答案和解析，按测验设置打乱顺序
pub async fn get_quiz_for_taking(
    engine: &QuizEngine,
    quiz_id: i64,
) -> Result<QuizForTakingResponse> {
    let quiz = engine.require_quiz(quiz_id).await?;
    if !quiz.is_published {
        return Err(QuizSystemError::quiz_not_published(format!(
            "测验 {quiz_id} 尚未发布"
        )));
    }

    let mut questions: Vec<PublicQuestion> = engine
        .load_questions(quiz_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    let mut rng = rand::rng();
    if quiz.shuffle_questions {
        questions.shuffle(&mut rng);
    }
    if quiz.shuffle_options {
        for question in &mut questions {
            question.options.shuffle(&mut rng);
        }
    }

    Ok(QuizForTakingResponse { quiz, questions })
}

pub async fn create_question(
    engine: &QuizEngine,
    quiz_id: i64,
    req: CreateQuestionRequest,
) -> Result<QuestionWithOptions> {
    engine.require_quiz(quiz_id).await?;
    validate_question(&req)?;

    // 新题目排在最后；删除题目后序号不连续，取现有最大值加一
    let order_index = engine
        .storage()
        .list_questions_by_quiz(quiz_id)
        .await?
        .iter()
        .map(|q| q.order_index + 1)
        .max()
        .unwrap_or(0);

    let created = engine
        .storage()
        .create_question(NewQuestion {
            quiz_id,
            question_type: req.question_type,
            question_text: req.question_text,
            points: req.points,
            order_index,
            explanation: req.explanation,
            options: req.options,
        })
        .await?;

    info!(
        "测验 {} 新增题目 {} ({})",
        quiz_id, created.question.id, created.question.question_type
    );
    Ok(created)
}

pub async fn delete_question(engine: &QuizEngine, quiz_id: i64, question_id: i64) -> Result<()> {
    engine.require_quiz(quiz_id).await?;

    if !engine.storage().delete_question(quiz_id, question_id).await? {
        return Err(QuizSystemError::question_not_found(format!(
            "题目 {question_id} 不属于测验 {quiz_id}"
        )));
    }

    info!("测验 {} 删除题目 {}", quiz_id, question_id);
    Ok(())
}

pub async fn reorder_questions(
    engine: &QuizEngine,
    quiz_id: i64,
    orders: Vec<QuestionOrder>,
) -> Result<()> {
    engine.require_quiz(quiz_id).await?;
    engine.storage().reorder_questions(quiz_id, &orders).await
}
