use actix_web::{get, web, HttpResponse};

use crate::state::AppState;

#[get("/health")]
pub async fn health(state: web::Data<std::sync::Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "embedding_model": state.engine.model(),
    }))
}
