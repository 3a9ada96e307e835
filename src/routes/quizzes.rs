use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::{AttemptService, QuizService};

// 懒加载的全局服务实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);
static ATTEMPT_SERVICE: Lazy<AttemptService> = Lazy::new(AttemptService::new_lazy);

// HTTP处理程序
pub async fn get_quiz_for_taking(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .get_quiz_for_taking(&req, quiz_id.into_inner())
        .await
}

pub async fn start_attempt(req: HttpRequest, quiz_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .start_attempt(&req, quiz_id.into_inner())
        .await
}

pub async fn list_my_attempts(
    req: HttpRequest,
    quiz_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ATTEMPT_SERVICE
        .list_my_attempts(&req, quiz_id.into_inner())
        .await
}

// 配置路由
pub fn configure_quizzes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            .service(
                // 已发布测验的作答视图，不含正确答案
                web::resource("/{quiz_id}").route(web::get().to(get_quiz_for_taking)),
            )
            .service(
                web::resource("/{quiz_id}/attempts").route(
                    web::post()
                        .to(start_attempt)
                        .wrap(middlewares::RateLimit::attempts()),
                ),
            )
            .service(
                // 当前用户的作答记录，最近一次在前
                web::resource("/{quiz_id}/attempts/my").route(web::get().to(list_my_attempts)),
            ),
    );
}
