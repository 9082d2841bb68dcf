use crate::types::{TaskInfo, TaskStatus};
use chrono::Utc;
use folio_vector::RefreshReport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct JobManager {
    tasks: Arc<RwLock<HashMap<String, TaskInfo>>>,
}

impl JobManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_task(&self, task_type: impl Into<String>) -> String {
        let task_id = Uuid::new_v4().to_string();
        let task_info = TaskInfo {
            task_id: task_id.clone(),
            task_type: task_type.into(),
            status: TaskStatus::Running,
            progress: 0,
            message: "Starting...".to_string(),
            started_at: Utc::now(),
            finished_at: None,
            report: None,
        };

        self.tasks.write().await.insert(task_id.clone(), task_info);
        task_id
    }

    /// Progress updates arriving after completion are ignored
    pub async fn update_progress(&self, task_id: &str, progress: u8, message: String) {
        if let Some(task) = self.tasks.write().await.get_mut(task_id) {
            if task.status == TaskStatus::Running {
                task.progress = progress.min(100);
                task.message = message;
            }
        }
    }

    pub async fn complete_task(&self, task_id: &str, report: RefreshReport) {
        if let Some(task) = self.tasks.write().await.get_mut(task_id) {
            task.status = TaskStatus::Completed;
            task.progress = 100;
            task.message = format!(
                "Completed: {} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            );
            task.finished_at = Some(Utc::now());
            task.report = Some(report);
        }
    }

    pub async fn fail_task(&self, task_id: &str, error: String) {
        if let Some(task) = self.tasks.write().await.get_mut(task_id) {
            task.status = TaskStatus::Failed;
            task.message = error;
            task.finished_at = Some(Utc::now());
        }
    }

    pub async fn get_task(&self, task_id: &str) -> Option<TaskInfo> {
        self.tasks.read().await.get(task_id).cloned()
    }

    pub async fn get_tasks(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<TaskInfo> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_lifecycle() {
        let jobs = JobManager::new();
        let id = jobs.create_task("embedding_refresh").await;

        jobs.update_progress(&id, 40, "2/5".to_string()).await;
        let task = jobs.get_task(&id).await.unwrap();
        assert_eq!(task.progress, 40);
        assert_eq!(task.status, TaskStatus::Running);

        jobs.complete_task(&id, RefreshReport::default()).await;
        jobs.update_progress(&id, 80, "late update".to_string()).await;

        let task = jobs.get_task(&id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);
        assert!(task.finished_at.is_some());
        assert!(task.message.starts_with("Completed"));
    }

    #[tokio::test]
    async fn test_failed_task() {
        let jobs = JobManager::new();
        let id = jobs.create_task("embedding_refresh").await;
        jobs.fail_task(&id, "store unavailable".to_string()).await;

        let task = jobs.get_task(&id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.message, "store unavailable");
        assert!(jobs.get_task("unknown").await.is_none());
    }
}
