use actix_web::{post, web, HttpResponse};
use folio_vector::RefreshProgress;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{EmbeddingMeta, EmbeddingResponse, ForceQuery, RefreshStartedResponse};

/// Generate (or reuse) the embedding of one record
#[post("/records/{id}/embedding")]
pub async fn ensure_embedding(
    id: web::Path<String>,
    query: web::Query<ForceQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let ensured = state.engine.ensure_embedding(&id, query.force).await?;

    Ok(HttpResponse::Ok().json(EmbeddingResponse {
        id: id.into_inner(),
        regenerated: ensured.regenerated,
        embedding: EmbeddingMeta::from(&ensured.embedding),
    }))
}

/// Start a background refresh of missing and stale embeddings
#[post("/embeddings/refresh")]
pub async fn refresh_embeddings(
    query: web::Query<ForceQuery>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let force = query.force;
    let task_id = state.job_manager.create_task("embedding_refresh").await;
    info!("Starting embedding refresh task {} (force={})", task_id, force);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<RefreshProgress>();

    // Progress forwarder
    let jobs = state.job_manager.clone();
    let progress_task_id = task_id.clone();
    actix_web::rt::spawn(async move {
        while let Some(progress) = rx.recv().await {
            jobs.update_progress(
                &progress_task_id,
                progress.percentage.round() as u8,
                format!("{}/{} records processed", progress.processed, progress.total),
            )
            .await;
        }
    });

    let engine = state.engine.clone();
    let jobs = state.job_manager.clone();
    let run_task_id = task_id.clone();
    actix_web::rt::spawn(async move {
        let result = engine
            .refresh(force, move |progress| {
                let _ = tx.send(progress);
            })
            .await;

        match result {
            Ok(report) => {
                info!(
                    "Refresh task {} finished: {}/{} succeeded",
                    run_task_id,
                    report.succeeded(),
                    report.total()
                );
                jobs.complete_task(&run_task_id, report).await;
            }
            Err(e) => {
                error!("Refresh task {} failed: {}", run_task_id, e);
                jobs.fail_task(&run_task_id, e.to_string()).await;
            }
        }
    });

    Ok(HttpResponse::Accepted().json(RefreshStartedResponse {
        task_id,
        message: "Embedding refresh started".to_string(),
    }))
}
