use actix_web::{get, web, HttpResponse};

use crate::error::ApiResult;
use crate::state::AppState;
use folio_common::FolioError;

#[get("/tasks")]
pub async fn get_tasks(state: web::Data<std::sync::Arc<AppState>>) -> ApiResult<HttpResponse> {
    let tasks = state.job_manager.get_tasks().await;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/tasks/{task_id}")]
pub async fn get_task_progress(
    task_id: web::Path<String>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let task = state
        .job_manager
        .get_task(&task_id)
        .await
        .ok_or_else(|| FolioError::not_found(format!("task {}", task_id)))?;

    Ok(HttpResponse::Ok().json(task))
}
