//! 内存存储实现
//!
//! 所有数据保存在进程内，用于本地开发和测试。每个存储操作持有同一把异步锁，
//! 完成作答和批改重算都在一次加锁内完成。

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::{QuizSystemError, Result};
use crate::models::{
    attempts::{
        entities::{AttemptState, QuizAnswer, QuizAttempt},
        requests::{AttemptCompletion, NewQuizAttempt},
        responses::AttemptWithAnswers,
    },
    grading::{requests::ManualGrade, responses::ManualGradeOutcome},
    questions::{
        entities::{Question, QuestionOption, QuestionWithOptions},
        requests::{NewQuestion, QuestionOrder},
    },
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, UpdateQuizRequest},
    },
};
use crate::storage::{Storage, answered_question_error};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    quizzes: BTreeMap<i64, Quiz>,
    questions: BTreeMap<i64, Question>,
    options: BTreeMap<i64, QuestionOption>,
    attempts: BTreeMap<i64, QuizAttempt>,
    answers: BTreeMap<i64, QuizAnswer>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn answers_of(&self, attempt_id: i64) -> Vec<QuizAnswer> {
        self.answers
            .values()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect()
    }
}

/// 内存存储
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_quiz(&self, created_by: i64, req: CreateQuizRequest) -> Result<Quiz> {
        let mut state = self.state.lock().await;
        let now = chrono::Utc::now();
        let quiz = Quiz {
            id: state.next_id(),
            course_id: req.course_id,
            lesson_id: req.lesson_id,
            title: req.title,
            description: req.description,
            passing_score: req.passing_score,
            time_limit: req.time_limit,
            max_attempts: req.max_attempts,
            shuffle_questions: req.shuffle_questions.unwrap_or(false),
            shuffle_options: req.shuffle_options.unwrap_or(false),
            show_correct_answers: req.show_correct_answers.unwrap_or(false),
            is_published: req.is_published.unwrap_or(false),
            created_by,
            created_at: now,
            updated_at: now,
        };
        state.quizzes.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn get_quiz_by_id(&self, quiz_id: i64) -> Result<Option<Quiz>> {
        Ok(self.state.lock().await.quizzes.get(&quiz_id).cloned())
    }

    async fn update_quiz(&self, quiz_id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>> {
        let mut state = self.state.lock().await;
        let Some(quiz) = state.quizzes.get_mut(&quiz_id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            quiz.title = title;
        }
        if let Some(description) = update.description {
            quiz.description = Some(description);
        }
        if let Some(passing_score) = update.passing_score {
            quiz.passing_score = passing_score;
        }
        if let Some(time_limit) = update.time_limit {
            quiz.time_limit = Some(time_limit);
        }
        if let Some(max_attempts) = update.max_attempts {
            quiz.max_attempts = Some(max_attempts);
        }
        if let Some(shuffle_questions) = update.shuffle_questions {
            quiz.shuffle_questions = shuffle_questions;
        }
        if let Some(shuffle_options) = update.shuffle_options {
            quiz.shuffle_options = shuffle_options;
        }
        if let Some(show_correct_answers) = update.show_correct_answers {
            quiz.show_correct_answers = show_correct_answers;
        }
        if let Some(is_published) = update.is_published {
            quiz.is_published = is_published;
        }
        quiz.updated_at = chrono::Utc::now();

        Ok(Some(quiz.clone()))
    }

    async fn create_question(&self, req: NewQuestion) -> Result<QuestionWithOptions> {
        let mut state = self.state.lock().await;
        let question = Question {
            id: state.next_id(),
            quiz_id: req.quiz_id,
            question_type: req.question_type,
            question_text: req.question_text,
            points: req.points,
            order_index: req.order_index,
            explanation: req.explanation,
            created_at: chrono::Utc::now(),
        };
        state.questions.insert(question.id, question.clone());

        let mut options = Vec::with_capacity(req.options.len());
        for (index, option) in req.options.into_iter().enumerate() {
            let option = QuestionOption {
                id: state.next_id(),
                question_id: question.id,
                option_text: option.option_text,
                is_correct: option.is_correct,
                order_index: index as i32,
            };
            state.options.insert(option.id, option.clone());
            options.push(option);
        }

        Ok(QuestionWithOptions { question, options })
    }

    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>> {
        Ok(self.state.lock().await.questions.get(&question_id).cloned())
    }

    async fn list_questions_by_quiz(&self, quiz_id: i64) -> Result<Vec<Question>> {
        let state = self.state.lock().await;
        let mut questions: Vec<Question> = state
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.order_index, q.id));
        Ok(questions)
    }

    async fn list_options_by_question_ids(
        &self,
        question_ids: &[i64],
    ) -> Result<Vec<QuestionOption>> {
        let state = self.state.lock().await;
        let wanted: HashSet<i64> = question_ids.iter().copied().collect();
        let mut options: Vec<QuestionOption> = state
            .options
            .values()
            .filter(|o| wanted.contains(&o.question_id))
            .cloned()
            .collect();
        options.sort_by_key(|o| (o.question_id, o.order_index, o.id));
        Ok(options)
    }

    async fn delete_question(&self, quiz_id: i64, question_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;
        let belongs = state
            .questions
            .get(&question_id)
            .is_some_and(|q| q.quiz_id == quiz_id);
        if !belongs {
            return Ok(false);
        }

        if state.answers.values().any(|a| a.question_id == question_id) {
            return Err(answered_question_error(question_id));
        }

        state.questions.remove(&question_id);
        state.options.retain(|_, o| o.question_id != question_id);
        Ok(true)
    }

    async fn reorder_questions(&self, quiz_id: i64, orders: &[QuestionOrder]) -> Result<()> {
        let mut state = self.state.lock().await;

        // 先整体校验，再修改
        if let Some(missing) = orders.iter().find(|o| {
            !state
                .questions
                .get(&o.question_id)
                .is_some_and(|q| q.quiz_id == quiz_id)
        }) {
            return Err(QuizSystemError::question_not_found(format!(
                "题目 {} 不属于测验 {quiz_id}",
                missing.question_id
            )));
        }

        for order in orders {
            if let Some(question) = state.questions.get_mut(&order.question_id) {
                question.order_index = order.order_index;
            }
        }
        Ok(())
    }

    async fn count_attempts(&self, quiz_id: i64, user_id: i64) -> Result<i64> {
        let state = self.state.lock().await;
        Ok(state
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .count() as i64)
    }

    async fn create_attempt(&self, req: NewQuizAttempt) -> Result<QuizAttempt> {
        let mut state = self.state.lock().await;

        let duplicated = state.attempts.values().any(|a| {
            a.quiz_id == req.quiz_id
                && a.user_id == req.user_id
                && a.attempt_number == req.attempt_number
        });
        if duplicated {
            return Err(QuizSystemError::database_operation(format!(
                "创建作答记录失败: 第 {} 次作答已存在",
                req.attempt_number
            )));
        }

        let attempt = QuizAttempt {
            id: state.next_id(),
            quiz_id: req.quiz_id,
            user_id: req.user_id,
            attempt_number: req.attempt_number,
            started_at: req.started_at,
            state: AttemptState::InProgress,
        };
        state.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn get_attempt_by_id(&self, attempt_id: i64) -> Result<Option<QuizAttempt>> {
        Ok(self.state.lock().await.attempts.get(&attempt_id).cloned())
    }

    async fn list_attempts_by_quiz(&self, quiz_id: i64) -> Result<Vec<QuizAttempt>> {
        let state = self.state.lock().await;
        Ok(state
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn list_user_attempts(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizAttempt>> {
        let state = self.state.lock().await;
        let mut attempts: Vec<QuizAttempt> = state
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.attempt_number.cmp(&a.attempt_number));
        Ok(attempts)
    }

    async fn complete_attempt(
        &self,
        completion: AttemptCompletion,
    ) -> Result<Option<AttemptWithAnswers>> {
        let mut state = self.state.lock().await;

        let in_progress = state
            .attempts
            .get(&completion.attempt_id)
            .is_some_and(|a| a.state.is_in_progress());
        if !in_progress {
            return Ok(None);
        }

        let now = chrono::Utc::now();
        for answer in completion.answers {
            let answer = QuizAnswer {
                id: state.next_id(),
                attempt_id: completion.attempt_id,
                question_id: answer.question_id,
                text_answer: answer.text_answer,
                selected_option_id: answer.selected_option_id,
                grade: answer.grade,
                points_awarded: answer.points_awarded,
                feedback: None,
                graded_by: None,
                graded_at: None,
                created_at: now,
            };
            state.answers.insert(answer.id, answer);
        }

        let answers = state.answers_of(completion.attempt_id);
        let Some(attempt) = state.attempts.get_mut(&completion.attempt_id) else {
            return Ok(None);
        };
        attempt.state = completion.state;

        Ok(Some(AttemptWithAnswers {
            attempt: attempt.clone(),
            answers,
        }))
    }

    async fn get_answer_by_id(&self, answer_id: i64) -> Result<Option<QuizAnswer>> {
        Ok(self.state.lock().await.answers.get(&answer_id).cloned())
    }

    async fn list_answers_by_attempt(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        Ok(self.state.lock().await.answers_of(attempt_id))
    }

    async fn list_answers_by_attempt_ids(&self, attempt_ids: &[i64]) -> Result<Vec<QuizAnswer>> {
        let state = self.state.lock().await;
        let wanted: HashSet<i64> = attempt_ids.iter().copied().collect();
        Ok(state
            .answers
            .values()
            .filter(|a| wanted.contains(&a.attempt_id))
            .cloned()
            .collect())
    }

    async fn apply_manual_grade(&self, grade: ManualGrade) -> Result<ManualGradeOutcome> {
        let mut state = self.state.lock().await;

        if !state.attempts.contains_key(&grade.attempt_id) {
            return Err(QuizSystemError::attempt_not_found(format!(
                "作答记录 {} 不存在",
                grade.attempt_id
            )));
        }

        let answer = {
            let Some(answer) = state.answers.get_mut(&grade.answer_id) else {
                return Err(QuizSystemError::answer_not_found(format!(
                    "答案 {} 不存在",
                    grade.answer_id
                )));
            };
            answer.grade = grade.grade;
            answer.points_awarded = grade.points_awarded;
            answer.feedback = grade.feedback;
            answer.graded_by = Some(grade.graded_by);
            answer.graded_at = Some(grade.graded_at);
            answer.clone()
        };

        let answers = state.answers_of(grade.attempt_id);
        let Some(attempt) = state.attempts.get_mut(&grade.attempt_id) else {
            return Err(QuizSystemError::attempt_not_found(format!(
                "作答记录 {} 不存在",
                grade.attempt_id
            )));
        };
        attempt.state = grade.scoring.recompute_state(&attempt.state, &answers);

        Ok(ManualGradeOutcome {
            answer,
            attempt: attempt.clone(),
        })
    }
}
