use actix_web::{get, web, HttpResponse};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{SearchQuery, SearchResponse};

#[get("/search")]
pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let request = query.to_request()?;
    let results = state.engine.search(&request).await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: request.query,
        count: results.len(),
        results,
    }))
}

#[get("/search/stats")]
pub async fn search_stats(state: web::Data<std::sync::Arc<AppState>>) -> ApiResult<HttpResponse> {
    let stats = state.engine.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
