use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::questions::requests::{CreateQuestionRequest, ReorderQuestionsRequest};
use crate::models::quizzes::requests::{CreateQuizRequest, UpdateQuizRequest};
use crate::models::users::entities::UserRole;
use crate::services::QuizService;

static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn create_quiz(
    req: HttpRequest,
    quiz_data: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.create_quiz(&req, quiz_data.into_inner()).await
}

pub async fn get_quiz_detail(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz_detail(&req, quiz_id.into_inner()).await
}

pub async fn update_quiz(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
    update_data: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_quiz(&req, quiz_id.into_inner(), update_data.into_inner())
        .await
}

pub async fn create_question(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
    question_data: web::Json<CreateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .create_question(&req, quiz_id.into_inner(), question_data.into_inner())
        .await
}

pub async fn delete_question(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (quiz_id, question_id) = path.into_inner();
    QUIZ_SERVICE
        .delete_question(&req, quiz_id, question_id)
        .await
}

pub async fn reorder_questions(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
    order_data: web::Json<ReorderQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .reorder_questions(&req, quiz_id.into_inner(), order_data.into_inner().orders)
        .await
}

// 出题与测验管理，仅教师和管理员可用
pub fn configure_manage_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/manage/quizzes")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::post().to(create_quiz)))
            .service(
                web::resource("/{quiz_id}")
                    .route(web::get().to(get_quiz_detail))
                    .route(web::put().to(update_quiz)),
            )
            .service(web::resource("/{quiz_id}/questions").route(web::post().to(create_question)))
            // 需要在 /{question_id} 之前注册
            .service(
                web::resource("/{quiz_id}/questions/order")
                    .route(web::put().to(reorder_questions)),
            )
            .service(
                web::resource("/{quiz_id}/questions/{question_id}")
                    .route(web::delete().to(delete_question)),
            ),
    );
}
