//! Folio HTTP Server
//!
//! Actix-web REST API for record embeddings and similarity search

pub mod error;
pub mod job_manager;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use folio_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use state::AppState;

/// Build state from configuration and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config).await?);

    serve(state, &bind_addr).await
}

/// Serve an already constructed state
pub async fn serve(state: Arc<AppState>, bind_addr: &str) -> Result<()> {
    info!("HTTP server listening on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(4 * 1024 * 1024))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use async_trait::async_trait;
    use folio_common::FolioError;
    use folio_embed::{EmbeddingProvider, TaskType};
    use folio_vector::{EngineOptions, MemoryRecordStore, VectorSearchEngine};
    use serde_json::{json, Value};
    use std::time::Duration;

    /// Two-topic provider: "rust" vs everything else
    struct TopicProvider;

    #[async_trait]
    impl EmbeddingProvider for TopicProvider {
        async fn embed(&self, text: &str, _task_type: TaskType) -> folio_common::Result<Vec<f32>> {
            if text.contains("FAIL") {
                return Err(FolioError::embedding_failed("injected failure"));
            }
            let rust = text.to_lowercase().matches("rust").count() as f32;
            Ok(vec![rust + 0.1, 1.0])
        }

        fn model(&self) -> &str {
            "topic-test"
        }
    }

    fn test_state() -> Arc<AppState> {
        let engine = VectorSearchEngine::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(TopicProvider),
            EngineOptions {
                embedding_dim: 2,
                body_word_limit: 50,
                batch_size: 2,
                batch_delay: Duration::from_millis(1),
            },
        );
        Arc::new(AppState::with_engine(AppConfig::default(), engine))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(routes::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health() {
        let state = test_state();
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["embedding_model"], "topic-test");
    }

    #[actix_web::test]
    async fn test_upsert_then_search() {
        let state = test_state();
        let app = app!(state);

        for (id, title) in [("rusty", "Rust rust rust"), ("garden", "Gardening notes")] {
            let req = test::TestRequest::post()
                .uri("/records")
                .set_json(json!({ "id": id, "kind": "blog", "title": title }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["embedding_state"], "fresh");
            assert!(body["embedding"]["vector"].is_null());
        }

        let req = test::TestRequest::get().uri("/search?q=rust&top_k=5").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["results"][0]["id"], "rusty");

        let req = test::TestRequest::get().uri("/search/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["fresh"], 2);
    }

    #[actix_web::test]
    async fn test_record_saved_when_embedding_fails() {
        let state = test_state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(json!({
                "id": "broken",
                "kind": "file",
                "title": "FAIL",
                "body": "quarterly report"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["embedding_state"], "missing");

        let req = test::TestRequest::get().uri("/records/broken").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["body"], "quarterly report");
        assert!(body.get("vector").is_none());

        let req = test::TestRequest::post().uri("/records/broken/embedding").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "embedding_generation_failed");
    }

    #[actix_web::test]
    async fn test_ensure_embedding_reuses_fresh_vector() {
        let state = test_state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(json!({ "id": "doc", "kind": "link", "title": "Rust" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri("/records/doc/embedding").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["regenerated"], false);

        let req = test::TestRequest::post()
            .uri("/records/doc/embedding?force=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["regenerated"], true);
        assert_eq!(body["embedding"]["dimension"], 2);
    }

    #[actix_web::test]
    async fn test_error_statuses() {
        let state = test_state();
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/search?q=%20").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_input");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/search?q=rust&kind=podcast").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/records/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, test::TestRequest::delete().uri("/records/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/tasks/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_refresh_task_is_tracked() {
        let state = test_state();
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/embeddings/refresh").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        let task_id = body["task_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/tasks/{}", task_id))
            .to_request();
        let task: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(task["task_type"], "embedding_refresh");

        let tasks: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/tasks").to_request()).await;
        assert_eq!(tasks.as_array().unwrap().len(), 1);
    }
}
