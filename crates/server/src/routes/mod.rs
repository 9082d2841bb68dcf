pub mod embedding;
pub mod record;
pub mod search;
pub mod system;
pub mod tasks;

use actix_web::web;

/// Register every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(system::health)
        .service(record::upsert_record)
        .service(record::list_records)
        .service(record::get_record)
        .service(record::delete_record)
        .service(embedding::ensure_embedding)
        .service(embedding::refresh_embeddings)
        .service(search::search_stats)
        .service(search::search)
        .service(tasks::get_tasks)
        .service(tasks::get_task_progress);
}
