use std::sync::Arc;

use chrono::{Duration, Utc};

use super::QuizEngine;
use crate::errors::QuizSystemError;
use crate::models::{
    attempts::{
        entities::{AnswerGrade, AttemptState},
        requests::{AnswerSubmission, NewQuizAttempt},
    },
    questions::{
        entities::{QuestionType, QuestionWithOptions},
        requests::{CreateOptionRequest, CreateQuestionRequest, QuestionOrder},
    },
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, UpdateQuizRequest},
    },
    users::entities::{CurrentUser, UserRole},
};
use crate::storage::{Storage, memory_storage::MemoryStorage};

const TEACHER: i64 = 100;
const STUDENT: i64 = 200;

struct Fixture {
    engine: QuizEngine,
    storage: Arc<dyn Storage>,
}

fn fixture() -> Fixture {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    Fixture {
        engine: QuizEngine::new(storage.clone()),
        storage,
    }
}

fn quiz_request(passing_score: i32) -> CreateQuizRequest {
    CreateQuizRequest {
        course_id: 1,
        lesson_id: Some(3),
        title: "所有权与借用".to_string(),
        description: None,
        passing_score,
        time_limit: None,
        max_attempts: None,
        shuffle_questions: None,
        shuffle_options: None,
        show_correct_answers: None,
        is_published: Some(true),
    }
}

impl Fixture {
    async fn quiz(&self, req: CreateQuizRequest) -> Quiz {
        self.engine.create_quiz(TEACHER, req).await.unwrap()
    }

    async fn choice(
        &self,
        quiz_id: i64,
        points: i32,
        correct: &str,
        texts: &[&str],
    ) -> QuestionWithOptions {
        self.engine
            .create_question(
                quiz_id,
                CreateQuestionRequest {
                    question_type: QuestionType::MultipleChoice,
                    question_text: "选择正确的一项".to_string(),
                    points,
                    explanation: Some("参考教材第三章".to_string()),
                    options: texts
                        .iter()
                        .map(|t| CreateOptionRequest {
                            option_text: t.to_string(),
                            is_correct: *t == correct,
                        })
                        .collect(),
                },
            )
            .await
            .unwrap()
    }

    async fn open_question(&self, quiz_id: i64, question_type: QuestionType, points: i32) -> i64 {
        self.engine
            .create_question(
                quiz_id,
                CreateQuestionRequest {
                    question_type,
                    question_text: "请简要说明".to_string(),
                    points,
                    explanation: None,
                    options: vec![],
                },
            )
            .await
            .unwrap()
            .question
            .id
    }
}

fn option_id(question: &QuestionWithOptions, text: &str) -> i64 {
    question
        .options
        .iter()
        .find(|o| o.option_text == text)
        .map(|o| o.id)
        .unwrap()
}

fn pick(question: &QuestionWithOptions, text: &str) -> AnswerSubmission {
    AnswerSubmission {
        question_id: question.question.id,
        text_answer: None,
        selected_option_id: Some(option_id(question, text)),
    }
}

fn write(question_id: i64, text: &str) -> AnswerSubmission {
    AnswerSubmission {
        question_id,
        text_answer: Some(text.to_string()),
        selected_option_id: None,
    }
}

#[tokio::test]
async fn test_max_attempts_enforced() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.max_attempts = Some(2);
    let quiz = f.quiz(req).await;

    let first = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let second = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    assert_eq!(first.attempt_number, 1);
    assert_eq!(second.attempt_number, 2);
    assert!(first.state.is_in_progress());

    let third = f.engine.start_attempt(quiz.id, STUDENT).await;
    assert!(matches!(third, Err(QuizSystemError::MaxAttemptsReached(_))));

    // 其他用户不受影响
    assert!(f.engine.start_attempt(quiz.id, STUDENT + 1).await.is_ok());
}

#[tokio::test]
async fn test_unlimited_attempts() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;

    for n in 1..=5 {
        let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
        assert_eq!(attempt.attempt_number, n);
    }
}

#[tokio::test]
async fn test_start_requires_published_quiz() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.is_published = None;
    let quiz = f.quiz(req).await;

    let result = f.engine.start_attempt(quiz.id, STUDENT).await;
    assert!(matches!(result, Err(QuizSystemError::QuizNotPublished(_))));

    let result = f.engine.start_attempt(quiz.id + 999, STUDENT).await;
    assert!(matches!(result, Err(QuizSystemError::QuizNotFound(_))));
}

#[tokio::test]
async fn test_auto_grading_multiple_choice() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(50)).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B", "C"]).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let wrong = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "B")])
        .await
        .unwrap();
    assert_eq!(wrong.answers[0].grade, AnswerGrade::Incorrect);
    assert_eq!(wrong.answers[0].points_awarded, 0);
    assert_eq!(wrong.attempt.state.score(), Some(0));
    assert_eq!(wrong.attempt.state.is_passed(), Some(false));

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let right = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A")])
        .await
        .unwrap();
    assert_eq!(right.answers[0].grade, AnswerGrade::Correct);
    assert_eq!(right.answers[0].points_awarded, 10);
    assert_eq!(right.attempt.state.score(), Some(100));
    assert!(right.attempt.state.is_graded());
}

#[tokio::test]
async fn test_essay_leaves_attempt_pending() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 10).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(
            attempt.id,
            STUDENT,
            vec![pick(&mc, "A"), write(essay, "借用检查器在编译期保证内存安全")],
        )
        .await
        .unwrap();

    assert!(matches!(
        submitted.attempt.state,
        AttemptState::PendingGrade { .. }
    ));
    assert_eq!(submitted.attempt.state.score(), None);
    assert_eq!(submitted.attempt.state.is_passed(), None);
}

#[tokio::test]
async fn test_end_to_end_grading_reaches_full_score() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(70)).await;
    let mc = f.choice(quiz.id, 60, "B", &["A", "B", "C"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 40).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&mc, "B"), write(essay, "回答")])
        .await
        .unwrap();
    assert!(!submitted.attempt.state.is_graded());

    let essay_answer = submitted
        .answers
        .iter()
        .find(|a| a.question_id == essay)
        .unwrap();
    let graded = f
        .engine
        .grade_essay_answer(essay_answer.id, TEACHER, 40, Some("论述完整".to_string()))
        .await
        .unwrap();
    assert_eq!(graded.grade, AnswerGrade::Correct);
    assert_eq!(graded.graded_by, Some(TEACHER));
    assert!(graded.graded_at.is_some());
    assert_eq!(graded.feedback.as_deref(), Some("论述完整"));

    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert_eq!(attempt.state.score(), Some(100));
    assert_eq!(attempt.state.is_passed(), Some(true));
}

#[tokio::test]
async fn test_grading_order_does_not_matter() {
    let mut scores = Vec::new();

    for reverse in [false, true] {
        let f = fixture();
        let quiz = f.quiz(quiz_request(60)).await;
        let mc = f.choice(quiz.id, 50, "A", &["A", "B"]).await;
        let e1 = f.open_question(quiz.id, QuestionType::Essay, 30).await;
        let e2 = f.open_question(quiz.id, QuestionType::Essay, 20).await;

        let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
        let submitted = f
            .engine
            .submit_attempt(
                attempt.id,
                STUDENT,
                vec![pick(&mc, "A"), write(e1, "一"), write(e2, "二")],
            )
            .await
            .unwrap();

        let mut grades: Vec<(i64, i32)> = submitted
            .answers
            .iter()
            .filter(|a| a.question_id != mc.question.id)
            .map(|a| (a.id, if a.question_id == e1 { 15 } else { 20 }))
            .collect();
        if reverse {
            grades.reverse();
        }

        let (first_id, first_points) = grades[0];
        f.engine
            .grade_essay_answer(first_id, TEACHER, first_points, None)
            .await
            .unwrap();
        let midway = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
        assert!(!midway.state.is_graded());

        let (second_id, second_points) = grades[1];
        f.engine
            .grade_essay_answer(second_id, TEACHER, second_points, None)
            .await
            .unwrap();
        let done = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
        scores.push(done.state.score());
    }

    // (50 + 15 + 20) / 100
    assert_eq!(scores, vec![Some(85), Some(85)]);
}

#[tokio::test]
async fn test_pass_boundary_is_inclusive() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(70)).await;
    let q1 = f.choice(quiz.id, 7, "A", &["A", "B"]).await;
    let q2 = f.choice(quiz.id, 3, "A", &["A", "B"]).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q1, "A"), pick(&q2, "B")])
        .await
        .unwrap();

    assert_eq!(submitted.attempt.state.score(), Some(70));
    assert_eq!(submitted.attempt.state.is_passed(), Some(true));
}

#[tokio::test]
async fn test_time_limit_exceeded_rejects_submission() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.time_limit = Some(10);
    let quiz = f.quiz(req).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    let attempt = f
        .storage
        .create_attempt(NewQuizAttempt {
            quiz_id: quiz.id,
            user_id: STUDENT,
            attempt_number: 1,
            started_at: Utc::now() - Duration::minutes(11),
        })
        .await
        .unwrap();

    let result = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A")])
        .await;
    assert!(matches!(result, Err(QuizSystemError::TimeLimitExceeded(_))));

    assert!(
        f.storage
            .list_answers_by_attempt(attempt.id)
            .await
            .unwrap()
            .is_empty()
    );
    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert!(attempt.state.is_in_progress());
}

#[tokio::test]
async fn test_submission_within_time_limit_records_minutes() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.time_limit = Some(10);
    let quiz = f.quiz(req).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    let attempt = f
        .storage
        .create_attempt(NewQuizAttempt {
            quiz_id: quiz.id,
            user_id: STUDENT,
            attempt_number: 1,
            started_at: Utc::now() - Duration::minutes(4),
        })
        .await
        .unwrap();

    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A")])
        .await
        .unwrap();
    assert_eq!(submitted.attempt.state.time_spent(), Some(4));
}

#[tokio::test]
async fn test_double_submission_rejected() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    f.engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A")])
        .await
        .unwrap();

    let again = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "B")])
        .await;
    assert!(matches!(
        again,
        Err(QuizSystemError::AttemptAlreadyComplete(_))
    ));
    assert_eq!(
        f.storage.list_answers_by_attempt(attempt.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_submission_ownership_and_question_checks() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let other_quiz = f.quiz(quiz_request(60)).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let foreign = f.choice(other_quiz.id, 10, "A", &["A", "B"]).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();

    let result = f
        .engine
        .submit_attempt(attempt.id, STUDENT + 1, vec![pick(&q, "A")])
        .await;
    assert!(matches!(result, Err(QuizSystemError::UnauthorizedAccess(_))));

    let result = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&foreign, "A")])
        .await;
    assert!(matches!(result, Err(QuizSystemError::QuestionNotFound(_))));

    let result = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A"), pick(&q, "B")])
        .await;
    assert!(matches!(result, Err(QuizSystemError::Validation(_))));

    let result = f.engine.submit_attempt(attempt.id + 999, STUDENT, vec![]).await;
    assert!(matches!(result, Err(QuizSystemError::AttemptNotFound(_))));

    // 以上失败都不改变作答状态
    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert!(attempt.state.is_in_progress());
}

#[tokio::test]
async fn test_empty_submission_scores_zero() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(0)).await;
    f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![])
        .await
        .unwrap();

    assert!(submitted.answers.is_empty());
    assert_eq!(submitted.attempt.state.score(), Some(0));
    assert_eq!(submitted.attempt.state.is_passed(), Some(true));
}

#[tokio::test]
async fn test_manual_grade_errors() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 20).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&mc, "A"), write(essay, "答")])
        .await
        .unwrap();

    let mc_answer = submitted
        .answers
        .iter()
        .find(|a| a.question_id == mc.question.id)
        .unwrap();
    let essay_answer = submitted
        .answers
        .iter()
        .find(|a| a.question_id == essay)
        .unwrap();

    let result = f.engine.grade_essay_answer(mc_answer.id, TEACHER, 10, None).await;
    assert!(matches!(
        result,
        Err(QuizSystemError::CannotGradeAutoGraded(_))
    ));

    let result = f
        .engine
        .grade_essay_answer(essay_answer.id, TEACHER, 21, None)
        .await;
    assert!(matches!(
        result,
        Err(QuizSystemError::InvalidPointsAwarded(_))
    ));

    let result = f
        .engine
        .grade_essay_answer(essay_answer.id, TEACHER, -5, None)
        .await;
    assert!(matches!(
        result,
        Err(QuizSystemError::InvalidPointsAwarded(_))
    ));

    let result = f.engine.grade_essay_answer(999_999, TEACHER, 1, None).await;
    assert!(matches!(result, Err(QuizSystemError::AnswerNotFound(_))));

    // 拒绝的批改不改变答案
    let unchanged = f
        .storage
        .get_answer_by_id(essay_answer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.grade, AnswerGrade::Ungraded);
}

#[tokio::test]
async fn test_short_answer_pending_then_gradable() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(50)).await;
    let short = f.open_question(quiz.id, QuestionType::ShortAnswer, 10).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(attempt.id, STUDENT, vec![write(short, "所有权")])
        .await
        .unwrap();
    assert!(!submitted.attempt.state.is_graded());

    let pending = f.engine.get_pending_grading(quiz.id).await.unwrap();
    assert_eq!(pending.len(), 1);

    f.engine
        .grade_essay_answer(pending[0].id, TEACHER, 6, None)
        .await
        .unwrap();

    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert_eq!(attempt.state.score(), Some(60));
    assert_eq!(attempt.state.is_passed(), Some(true));
    assert!(f.engine.get_pending_grading(quiz.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_grading_across_attempts() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 10).await;

    for user in [STUDENT, STUDENT + 1] {
        let attempt = f.engine.start_attempt(quiz.id, user).await.unwrap();
        f.engine
            .submit_attempt(attempt.id, user, vec![pick(&mc, "B"), write(essay, "答")])
            .await
            .unwrap();
    }
    // 尚未提交的作答不出现在待批改列表中
    f.engine.start_attempt(quiz.id, STUDENT + 2).await.unwrap();

    let pending = f.engine.get_pending_grading(quiz.id).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|a| a.question_id == essay));

    let result = f.engine.get_pending_grading(quiz.id + 999).await;
    assert!(matches!(result, Err(QuizSystemError::QuizNotFound(_))));
}

#[tokio::test]
async fn test_quiz_statistics() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    for (user, choice) in [(1, "A"), (2, "A"), (3, "B")] {
        let attempt = f.engine.start_attempt(quiz.id, user).await.unwrap();
        f.engine
            .submit_attempt(attempt.id, user, vec![pick(&mc, choice)])
            .await
            .unwrap();
    }
    f.engine.start_attempt(quiz.id, 4).await.unwrap();

    let stats = f.engine.get_quiz_statistics(quiz.id).await.unwrap();
    assert_eq!(stats.total_attempts, 4);
    assert_eq!(stats.completed_attempts, 3);
    assert_eq!(stats.average_score, 66.67);
    assert_eq!(stats.pass_rate, 66.67);
    assert_eq!(stats.average_time_spent, 0.0);
}

#[tokio::test]
async fn test_reorder_batch_is_atomic() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(f.choice(quiz.id, 1, "A", &["A", "B"]).await.question.id);
    }

    let mut orders: Vec<QuestionOrder> = ids
        .iter()
        .rev()
        .enumerate()
        .map(|(index, id)| QuestionOrder {
            question_id: *id,
            order_index: index as i32,
        })
        .collect();
    orders.push(QuestionOrder {
        question_id: 424_242,
        order_index: 4,
    });

    let result = f.engine.reorder_questions(quiz.id, orders).await;
    assert!(matches!(result, Err(QuizSystemError::QuestionNotFound(_))));

    let detail = f.engine.get_quiz_detail(quiz.id).await.unwrap();
    let order: Vec<(i64, i32)> = detail
        .questions
        .iter()
        .map(|q| (q.question.id, q.question.order_index))
        .collect();
    let expected: Vec<(i64, i32)> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i32))
        .collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_reorder_applies_new_order() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let first = f.choice(quiz.id, 1, "A", &["A", "B"]).await.question.id;
    let second = f.choice(quiz.id, 1, "A", &["A", "B"]).await.question.id;

    f.engine
        .reorder_questions(
            quiz.id,
            vec![
                QuestionOrder {
                    question_id: first,
                    order_index: 1,
                },
                QuestionOrder {
                    question_id: second,
                    order_index: 0,
                },
            ],
        )
        .await
        .unwrap();

    let detail = f.engine.get_quiz_detail(quiz.id).await.unwrap();
    let ids: Vec<i64> = detail.questions.iter().map(|q| q.question.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn test_authoring_validation_before_persistence() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;

    let result = f
        .engine
        .create_question(
            quiz.id,
            CreateQuestionRequest {
                question_type: QuestionType::TrueFalse,
                question_text: "Rust 有垃圾回收".to_string(),
                points: 5,
                explanation: None,
                options: ["对", "错", "都不对"]
                    .iter()
                    .map(|t| CreateOptionRequest {
                        option_text: t.to_string(),
                        is_correct: *t == "错",
                    })
                    .collect(),
            },
        )
        .await;
    assert!(matches!(result, Err(QuizSystemError::Validation(_))));

    let result = f
        .engine
        .create_question(
            quiz.id,
            CreateQuestionRequest {
                question_type: QuestionType::MultipleChoice,
                question_text: "选择".to_string(),
                points: 5,
                explanation: None,
                options: vec![CreateOptionRequest {
                    option_text: "A".to_string(),
                    is_correct: false,
                }],
            },
        )
        .await;
    assert!(matches!(result, Err(QuizSystemError::Validation(_))));

    assert!(
        f.storage
            .list_questions_by_quiz(quiz.id)
            .await
            .unwrap()
            .is_empty()
    );

    let mut bad_quiz = quiz_request(120);
    bad_quiz.max_attempts = Some(0);
    let result = f.engine.create_quiz(TEACHER, bad_quiz).await;
    assert!(matches!(result, Err(QuizSystemError::Validation(_))));
}

#[tokio::test]
async fn test_question_order_index_defaults_to_end() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let a = f.choice(quiz.id, 1, "A", &["A", "B"]).await;
    let b = f.open_question(quiz.id, QuestionType::Essay, 1).await;

    assert_eq!(a.question.order_index, 0);
    let b = f.storage.get_question_by_id(b).await.unwrap().unwrap();
    assert_eq!(b.order_index, 1);
}

#[tokio::test]
async fn test_delete_question() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let other = f.quiz(quiz_request(60)).await;
    let q = f.choice(quiz.id, 1, "A", &["A", "B"]).await;

    let result = f.engine.delete_question(other.id, q.question.id).await;
    assert!(matches!(result, Err(QuizSystemError::QuestionNotFound(_))));

    f.engine.delete_question(quiz.id, q.question.id).await.unwrap();
    let detail = f.engine.get_quiz_detail(quiz.id).await.unwrap();
    assert!(detail.questions.is_empty());
}

#[tokio::test]
async fn test_order_index_after_delete_does_not_collide() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let first = f.open_question(quiz.id, QuestionType::Essay, 1).await;
    f.open_question(quiz.id, QuestionType::Essay, 1).await;
    f.open_question(quiz.id, QuestionType::Essay, 1).await;

    f.engine.delete_question(quiz.id, first).await.unwrap();
    let added = f.open_question(quiz.id, QuestionType::Essay, 1).await;

    let indexes: Vec<i32> = f
        .storage
        .list_questions_by_quiz(quiz.id)
        .await
        .unwrap()
        .iter()
        .map(|q| q.order_index)
        .collect();
    assert_eq!(indexes, vec![1, 2, 3]);
    let added = f.storage.get_question_by_id(added).await.unwrap().unwrap();
    assert_eq!(added.order_index, 3);
}

#[tokio::test]
async fn test_answered_question_cannot_be_deleted() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 10).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    f.engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&mc, "A"), write(essay, "回答")])
        .await
        .unwrap();

    let result = f.engine.delete_question(quiz.id, essay).await;
    assert!(matches!(result, Err(QuizSystemError::Validation(_))));

    // 作答记录仍可批改
    let pending = f.engine.get_pending_grading(quiz.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].question_id, essay);
    assert_eq!(
        f.storage.list_answers_by_attempt(attempt.id).await.unwrap().len(),
        2
    );

    f.engine
        .grade_essay_answer(pending[0].id, TEACHER, 10, None)
        .await
        .unwrap();
    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert_eq!(attempt.state.score(), Some(100));
}

#[tokio::test]
async fn test_concurrent_submissions_record_one_answer_set() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let q = f.choice(quiz.id, 10, "A", &["A", "B"]).await;
    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();

    let (first, second) = tokio::join!(
        f.engine
            .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "A")]),
        f.engine
            .submit_attempt(attempt.id, STUDENT, vec![pick(&q, "B")]),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(QuizSystemError::AttemptAlreadyComplete(_))
    )));
    assert_eq!(
        f.storage.list_answers_by_attempt(attempt.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_grading_of_one_attempt() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    let mc = f.choice(quiz.id, 50, "A", &["A", "B"]).await;
    let e1 = f.open_question(quiz.id, QuestionType::Essay, 30).await;
    let e2 = f.open_question(quiz.id, QuestionType::Essay, 20).await;

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    let submitted = f
        .engine
        .submit_attempt(
            attempt.id,
            STUDENT,
            vec![pick(&mc, "A"), write(e1, "一"), write(e2, "二")],
        )
        .await
        .unwrap();
    let answer_of = |question_id: i64| {
        submitted
            .answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.id)
            .unwrap()
    };

    let (first, second) = tokio::join!(
        f.engine.grade_essay_answer(answer_of(e1), TEACHER, 15, None),
        f.engine.grade_essay_answer(answer_of(e2), TEACHER, 20, None),
    );
    first.unwrap();
    second.unwrap();

    // (50 + 15 + 20) / 100
    let attempt = f.storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert!(attempt.state.is_graded());
    assert_eq!(attempt.state.score(), Some(85));
    assert_eq!(attempt.state.is_passed(), Some(true));
}

#[tokio::test]
async fn test_update_quiz_publishes() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.is_published = Some(false);
    let quiz = f.quiz(req).await;

    let result = f.engine.get_quiz_for_taking(quiz.id).await;
    assert!(matches!(result, Err(QuizSystemError::QuizNotPublished(_))));

    let updated = f
        .engine
        .update_quiz(
            quiz.id,
            UpdateQuizRequest {
                is_published: Some(true),
                title: Some("新标题".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_published);
    assert_eq!(updated.title, "新标题");
    assert_eq!(updated.passing_score, 60);

    let result = f
        .engine
        .update_quiz(quiz.id + 999, Default::default())
        .await;
    assert!(matches!(result, Err(QuizSystemError::QuizNotFound(_))));
}

#[tokio::test]
async fn test_quiz_for_taking_keeps_all_questions() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.shuffle_questions = Some(true);
    req.shuffle_options = Some(true);
    let quiz = f.quiz(req).await;
    let mc = f.choice(quiz.id, 1, "A", &["A", "B", "C", "D"]).await;
    let essay = f.open_question(quiz.id, QuestionType::Essay, 1).await;

    let view = f.engine.get_quiz_for_taking(quiz.id).await.unwrap();
    let mut ids: Vec<i64> = view.questions.iter().map(|q| q.id).collect();
    ids.sort();
    assert_eq!(ids, vec![mc.question.id, essay]);

    let public_mc = view
        .questions
        .iter()
        .find(|q| q.id == mc.question.id)
        .unwrap();
    let mut option_ids: Vec<i64> = public_mc.options.iter().map(|o| o.id).collect();
    option_ids.sort();
    let mut expected: Vec<i64> = mc.options.iter().map(|o| o.id).collect();
    expected.sort();
    assert_eq!(option_ids, expected);
}

#[tokio::test]
async fn test_attempt_visibility() {
    let f = fixture();
    let mut req = quiz_request(60);
    req.show_correct_answers = Some(true);
    let quiz = f.quiz(req).await;
    let mc = f.choice(quiz.id, 10, "A", &["A", "B"]).await;

    let owner = CurrentUser {
        id: STUDENT,
        role: UserRole::User,
    };
    let stranger = CurrentUser {
        id: STUDENT + 1,
        role: UserRole::User,
    };
    let teacher = CurrentUser {
        id: TEACHER,
        role: UserRole::Teacher,
    };

    let attempt = f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();

    // 作答中不展示答案
    let detail = f.engine.get_attempt(attempt.id, &owner).await.unwrap();
    assert!(detail.correct_options.is_none());

    f.engine
        .submit_attempt(attempt.id, STUDENT, vec![pick(&mc, "B")])
        .await
        .unwrap();

    let detail = f.engine.get_attempt(attempt.id, &owner).await.unwrap();
    let correct = detail.correct_options.unwrap();
    assert_eq!(correct.len(), 1);
    assert_eq!(correct[0].option_ids, vec![option_id(&mc, "A")]);

    let result = f.engine.get_attempt(attempt.id, &stranger).await;
    assert!(matches!(result, Err(QuizSystemError::UnauthorizedAccess(_))));

    let detail = f.engine.get_attempt(attempt.id, &teacher).await.unwrap();
    assert_eq!(detail.answers.len(), 1);
    assert!(detail.correct_options.is_some());
}

#[tokio::test]
async fn test_list_user_attempts_newest_first() {
    let f = fixture();
    let quiz = f.quiz(quiz_request(60)).await;
    for _ in 0..3 {
        f.engine.start_attempt(quiz.id, STUDENT).await.unwrap();
    }
    f.engine.start_attempt(quiz.id, STUDENT + 1).await.unwrap();

    let attempts = f.engine.list_user_attempts(quiz.id, STUDENT).await.unwrap();
    let numbers: Vec<i32> = attempts.iter().map(|a| a.attempt_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
}
