use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grading::requests::GradeAnswerRequest;
use crate::models::users::entities::UserRole;
use crate::services::GradingService;

static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

pub async fn grade_answer(
    req: HttpRequest,
    answer_id: web::Path<i64>,
    grade_data: web::Json<GradeAnswerRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .grade_answer(&req, answer_id.into_inner(), grade_data.into_inner())
        .await
}

pub async fn list_pending(req: HttpRequest, quiz_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .list_pending(&req, quiz_id.into_inner())
        .await
}

pub async fn get_statistics(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .get_statistics(&req, quiz_id.into_inner())
        .await
}

pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/answers/{answer_id}").route(web::put().to(grade_answer)))
            .service(
                web::resource("/quizzes/{quiz_id}/pending").route(web::get().to(list_pending)),
            )
            .service(
                web::resource("/quizzes/{quiz_id}/statistics")
                    .route(web::get().to(get_statistics)),
            ),
    );
}
