pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::programs::handlers as programs;
use crate::recommendations::handlers as recommendations;
use crate::riasec::handlers as riasec;
use crate::state::AppState;
use crate::student::handlers as student;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/refresh", post(auth::handle_refresh))
        .route("/auth/logout", post(auth::handle_logout))
        .route("/auth/me", get(auth::handle_me))
        // Student
        .route(
            "/student/profile",
            get(student::handle_get_profile).put(student::handle_update_profile),
        )
        .route(
            "/student/grades",
            get(student::handle_list_grades).post(student::handle_create_grade),
        )
        .route(
            "/student/grades/:id",
            put(student::handle_update_grade).delete(student::handle_delete_grade),
        )
        .route(
            "/student/values",
            get(student::handle_get_values)
                .post(student::handle_create_values)
                .put(student::handle_update_values)
                .delete(student::handle_delete_values),
        )
        // RIASEC
        .route("/riasec/questions", get(riasec::handle_get_questions))
        .route("/riasec/submit", post(riasec::handle_submit))
        .route("/riasec/results/latest", get(riasec::handle_latest_result))
        .route(
            "/riasec/results/latest/download-pdf",
            get(riasec::handle_download_pdf),
        )
        .route("/riasec/results/history", get(riasec::handle_history))
        .route("/riasec/careers/:code", get(riasec::handle_careers))
        .route("/riasec/draft/save", post(riasec::handle_save_draft))
        .route(
            "/riasec/draft",
            get(riasec::handle_get_draft).delete(riasec::handle_delete_draft),
        )
        // Programs
        .route("/programs", get(programs::handle_list_programs))
        .route("/programs/search", get(programs::handle_search_programs))
        .route("/programs/statistics", get(programs::handle_statistics))
        .route("/programs/:id", get(programs::handle_get_program))
        .route(
            "/programs/:id/compatibility",
            get(programs::handle_compatibility),
        )
        // Recommendations
        .route("/recommendations", get(recommendations::handle_list))
        .route(
            "/recommendations/generate",
            post(recommendations::handle_generate),
        )
        .route("/recommendations/:id", get(recommendations::handle_get))
        // Université de Bertoua catalog
        .route(
            "/ubertoua/establishments",
            get(catalog::handle_establishments),
        )
        .route(
            "/ubertoua/establishments/:establishment_id/departments",
            get(catalog::handle_departments),
        )
        .route(
            "/ubertoua/establishments/:establishment_id/departments/:department_id/programs",
            get(catalog::handle_programs),
        )
        .route(
            "/ubertoua/establishments/:establishment_id/departments/:department_id/ue",
            get(catalog::handle_teaching_units),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use super::*;
    use crate::auth::handlers::{LOGIN_ATTEMPT_WINDOW_SECONDS, MAX_LOGIN_ATTEMPTS};
    use crate::auth::tokens::issue_pair;
    use crate::cache::SessionCache;
    use crate::models::user::{UserRow, ROLE_STUDENT};
    use crate::cache::memory::MemorySessionCache;
    use crate::catalog::UniversityCatalog;
    use crate::config::Config;

    /// Router over a lazy pool: only routes that never reach the database are exercised.
    fn app() -> Router {
        app_with_cache(Arc::new(MemorySessionCache::default()))
    }

    fn app_with_cache(cache: Arc<MemorySessionCache>) -> Router {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        build_router(AppState {
            db,
            cache,
            config,
            catalog: Arc::new(UniversityCatalog::embedded().unwrap()),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_lists_links() {
        let response = app().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["name"], "OrientCam API");
        assert_eq!(body["health"], "/health");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = app().oneshot(get_request("/api/v1/auth/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_login_throttled_after_failed_attempts() {
        let cache = Arc::new(MemorySessionCache::default());
        for _ in 0..MAX_LOGIN_ATTEMPTS {
            cache
                .increment_login_attempts("awa@example.cm", LOGIN_ATTEMPT_WINDOW_SECONDS)
                .await;
        }

        let response = app_with_cache(cache)
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({"email": "Awa@Example.cm", "password": "Secret#123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let config = Config::for_tests();
        let now = chrono::Utc::now();
        let user = UserRow {
            id: uuid::Uuid::new_v4(),
            email: "awa@example.cm".to_string(),
            password_hash: String::new(),
            role: ROLE_STUDENT.to_string(),
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        let tokens = issue_pair(&config, &user).unwrap();

        let response = app()
            .oneshot(post_json(
                "/api/v1/auth/refresh",
                json!({"refresh_token": tokens.access_token}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Invalid token type");
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let request = Request::builder()
            .uri("/api/v1/recommendations")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_careers_lookup() {
        let response = app()
            .oneshot(get_request("/api/v1/riasec/careers/ias"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["holland_code"], "IAS");
        assert_eq!(body["matching_careers"].as_array().unwrap().len(), 8);

        let response = app()
            .oneshot(get_request("/api/v1/riasec/careers/RIAS"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_short_search_is_rejected() {
        let response = app()
            .oneshot(get_request("/api/v1/programs/search?q=a"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let response = app()
            .oneshot(get_request("/api/v1/ubertoua/establishments"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await.as_array().unwrap().len() >= 8);

        let response = app()
            .oneshot(get_request("/api/v1/ubertoua/establishments/NOPE/departments"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app()
            .oneshot(get_request(
                "/api/v1/ubertoua/establishments/FSJP/departments/DROIT_PUBLIC/ue?level=Licence%203",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["ue"][0], "Droit constitutionnel");

        let response = app()
            .oneshot(get_request(
                "/api/v1/ubertoua/establishments/FSJP/departments/DROIT_PUBLIC/programs",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
