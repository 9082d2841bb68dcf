use actix_web::{delete, get, post, web, HttpResponse};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{RecordPayload, RecordView, SuccessResponse};
use folio_common::FolioError;

/// Create or replace a record; its embedding is generated best-effort
#[post("/records")]
pub async fn upsert_record(
    req: web::Json<RecordPayload>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let record = req.into_inner().into_record()?;
    info!("Saving record: {} ({})", record.id, record.kind);

    let saved = state.engine.upsert_record(record).await?;
    let view = RecordView::new(&saved, state.engine.embedding_state(&saved));

    Ok(HttpResponse::Ok().json(view))
}

#[get("/records")]
pub async fn list_records(state: web::Data<std::sync::Arc<AppState>>) -> ApiResult<HttpResponse> {
    let records = state.engine.store().list().await?;
    let views: Vec<RecordView> = records
        .iter()
        .map(|r| RecordView::new(r, state.engine.embedding_state(r)))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

#[get("/records/{id}")]
pub async fn get_record(
    id: web::Path<String>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let record = state
        .engine
        .store()
        .get(id.as_str())
        .await?
        .ok_or_else(|| FolioError::not_found(format!("record {}", id)))?;

    Ok(HttpResponse::Ok().json(RecordView::new(&record, state.engine.embedding_state(&record))))
}

#[delete("/records/{id}")]
pub async fn delete_record(
    id: web::Path<String>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    state.engine.delete_record(&id).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse {
        success: true,
        message: Some(format!("Record {} deleted", id)),
    }))
}
