use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attempts::requests::SubmitAttemptRequest;
use crate::services::AttemptService;

static ATTEMPT_SERVICE: Lazy<AttemptService> = Lazy::new(AttemptService::new_lazy);

pub async fn submit_attempt(
    req: HttpRequest,
    attempt_id: web::Path<i64>,
    submit_data: web::Json<SubmitAttemptRequest>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .submit_attempt(&req, attempt_id.into_inner(), submit_data.into_inner())
        .await
}

pub async fn get_attempt(req: HttpRequest, attempt_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .get_attempt(&req, attempt_id.into_inner())
        .await
}

pub fn configure_attempts_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attempts")
            .wrap(middlewares::RequireJWT)
            .service(
                // 作答者本人和教师可查看
                web::resource("/{attempt_id}").route(web::get().to(get_attempt)),
            )
            .service(
                web::resource("/{attempt_id}/submit").route(
                    web::post()
                        .to(submit_attempt)
                        .wrap(middlewares::RateLimit::attempts()),
                ),
            ),
    );
}
