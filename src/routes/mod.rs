pub mod attempts;

pub mod grading;

pub mod manage;

pub mod quizzes;

pub use attempts::configure_attempts_routes;
pub use grading::configure_grading_routes;
pub use manage::configure_manage_routes;
pub use quizzes::configure_quizzes_routes;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::{Storage, memory_storage::MemoryStorage};
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn auth(user_id: i64, role: UserRole) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user_id, &role).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    macro_rules! quiz_app {
        () => {{
            let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(storage))
                    .configure(configure_quizzes_routes)
                    .configure(configure_attempts_routes)
                    .configure(configure_manage_routes)
                    .configure(configure_grading_routes),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_student_cannot_manage_quizzes() {
        let app = quiz_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/manage/quizzes")
            .insert_header(auth(10, UserRole::User))
            .set_json(json!({ "course_id": 1, "title": "期中测验", "passing_score": 60 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_quiz_flow_over_http() {
        let app = quiz_app!();
        let teacher = 1;
        let student = 2;

        // 创建并发布测验
        let req = test::TestRequest::post()
            .uri("/api/v1/manage/quizzes")
            .insert_header(auth(teacher, UserRole::Teacher))
            .set_json(json!({
                "course_id": 1,
                "title": "期中测验",
                "passing_score": 70,
                "is_published": true
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let quiz_id = body["data"]["id"].as_i64().unwrap();

        // 选择题 60 分，问答题 40 分
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/manage/quizzes/{quiz_id}/questions"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .set_json(json!({
                "question_type": "multiple_choice",
                "question_text": "哪一个是正确答案？",
                "points": 60,
                "options": [
                    { "option_text": "A" },
                    { "option_text": "B", "is_correct": true }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let mc_id = body["data"]["id"].as_i64().unwrap();
        let correct_option = body["data"]["options"][1]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/manage/quizzes/{quiz_id}/questions"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .set_json(json!({
                "question_type": "essay",
                "question_text": "简述所有权规则",
                "points": 40
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let essay_id = body["data"]["id"].as_i64().unwrap();

        // 学生视图不包含正确答案
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/quizzes/{quiz_id}"))
            .insert_header(auth(student, UserRole::User))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(!body.to_string().contains("is_correct"));

        // 开始作答并提交
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/attempts"))
            .insert_header(auth(student, UserRole::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let attempt_id = body["data"]["id"].as_i64().unwrap();

        let submit = json!({
            "answers": [
                { "question_id": mc_id, "selected_option_id": correct_option },
                { "question_id": essay_id, "text_answer": "每个值只有一个所有者" }
            ]
        });
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/attempts/{attempt_id}/submit"))
            .insert_header(auth(student, UserRole::User))
            .set_json(&submit)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["attempt"]["state"]["status"], "pending_grade");

        // 重复提交被拒绝
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/attempts/{attempt_id}/submit"))
            .insert_header(auth(student, UserRole::User))
            .set_json(&submit)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // 其他学生无权查看
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/attempts/{attempt_id}"))
            .insert_header(auth(99, UserRole::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // 教师查看待批改列表并批改
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/grading/quizzes/{quiz_id}/pending"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        let answer_id = items[0]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/grading/answers/{answer_id}"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .set_json(json!({ "points_awarded": 41 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/grading/answers/{answer_id}"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .set_json(json!({ "points_awarded": 40, "feedback": "很好" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/attempts/{attempt_id}"))
            .insert_header(auth(student, UserRole::User))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["attempt"]["state"]["status"], "graded");
        assert_eq!(body["data"]["attempt"]["state"]["score"], 100);
        assert_eq!(body["data"]["attempt"]["state"]["is_passed"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/grading/quizzes/{quiz_id}/statistics"))
            .insert_header(auth(teacher, UserRole::Teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["completed_attempts"], 1);
        assert_eq!(body["data"]["pass_rate"], 100.0);
    }

    #[actix_web::test]
    async fn test_missing_quiz_is_not_found() {
        let app = quiz_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/quizzes/404/attempts")
            .insert_header(auth(3, UserRole::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
