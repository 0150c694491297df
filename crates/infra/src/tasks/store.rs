//! Task storage implementations.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use forgewms_core::{DomainError, TenantId, UserId};
use forgewms_tasks::{Task, TaskId, TaskKind, TaskStatus};

/// Task store abstraction.
pub trait TaskStore: Send + Sync {
    /// Enqueue a new task.
    fn enqueue(&self, task: Task) -> Result<TaskId, TaskStoreError>;

    /// Get a task by ID.
    fn get(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Option<Task>, TaskStoreError>;

    /// List tasks, optionally filtered by status, in queue order
    /// (priority first, oldest first within a priority).
    fn list(
        &self,
        tenant_id: TenantId,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<Task>, TaskStoreError>;

    /// True when a pending or in-progress task with exactly this kind
    /// already exists. The replenishment scanner uses this to avoid
    /// flooding the queue for a location that is already being handled.
    fn has_open(&self, tenant_id: TenantId, kind: &TaskKind) -> Result<bool, TaskStoreError>;

    /// Assign the task to an operator.
    fn assign(
        &self,
        tenant_id: TenantId,
        task_id: TaskId,
        assignee: UserId,
    ) -> Result<Task, TaskStoreError>;

    /// Move a pending task to in-progress.
    fn start(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError>;

    /// Move an in-progress task to done.
    fn complete(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError>;

    /// Get task statistics.
    fn stats(&self, tenant_id: TenantId) -> Result<TaskStats, TaskStoreError>;
}

/// Task store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskStoreError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("tenant isolation violation")]
    TenantIsolation,
    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),
    #[error("{0}")]
    Rejected(DomainError),
}

impl From<TaskStoreError> for DomainError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => {
                DomainError::not_found(format!("task {id} not found"))
            }
            // Existence of another tenant's task is not leaked.
            TaskStoreError::TenantIsolation => DomainError::not_found("task not found"),
            TaskStoreError::AlreadyExists(id) => {
                DomainError::conflict(format!("task {id} already exists"))
            }
            TaskStoreError::Rejected(inner) => inner,
        }
    }
}

/// Task statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TaskStats {
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
}

/// In-memory task store.
#[derive(Debug)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn transition<F>(
        &self,
        tenant_id: TenantId,
        task_id: TaskId,
        apply: F,
    ) -> Result<Task, TaskStoreError>
    where
        F: FnOnce(&mut Task) -> forgewms_core::DomainResult<()>,
    {
        let mut tasks = self.tasks.write().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or(TaskStoreError::NotFound(task_id))?;
        if task.tenant_id != tenant_id {
            return Err(TaskStoreError::TenantIsolation);
        }
        apply(task).map_err(TaskStoreError::Rejected)?;
        Ok(task.clone())
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn enqueue(&self, task: Task) -> Result<TaskId, TaskStoreError> {
        let mut tasks = self.tasks.write().unwrap();
        if tasks.contains_key(&task.id) {
            return Err(TaskStoreError::AlreadyExists(task.id));
        }
        let id = task.id;
        tasks.insert(id, task);
        Ok(id)
    }

    fn get(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Option<Task>, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        match tasks.get(&task_id) {
            Some(task) if task.tenant_id == tenant_id => Ok(Some(task.clone())),
            Some(_) => Err(TaskStoreError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn list(
        &self,
        tenant_id: TenantId,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<Task>, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut result: Vec<_> = tasks
            .values()
            .filter(|t| t.tenant_id == tenant_id && status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();

        result.sort_by_key(|t| (Reverse(t.priority), t.created_at));
        result.truncate(limit);
        Ok(result)
    }

    fn has_open(&self, tenant_id: TenantId, kind: &TaskKind) -> Result<bool, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks
            .values()
            .any(|t| t.tenant_id == tenant_id && &t.kind == kind && t.status.is_open()))
    }

    fn assign(
        &self,
        tenant_id: TenantId,
        task_id: TaskId,
        assignee: UserId,
    ) -> Result<Task, TaskStoreError> {
        self.transition(tenant_id, task_id, |task| task.assign(assignee))
    }

    fn start(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError> {
        self.transition(tenant_id, task_id, |task| task.start())
    }

    fn complete(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError> {
        self.transition(tenant_id, task_id, |task| task.complete())
    }

    fn stats(&self, tenant_id: TenantId) -> Result<TaskStats, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut stats = TaskStats::default();

        for task in tasks.values() {
            if task.tenant_id != tenant_id {
                continue;
            }
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Done => stats.done += 1,
            }
        }

        Ok(stats)
    }
}

impl TaskStore for Arc<InMemoryTaskStore> {
    fn enqueue(&self, task: Task) -> Result<TaskId, TaskStoreError> {
        (**self).enqueue(task)
    }

    fn get(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Option<Task>, TaskStoreError> {
        (**self).get(tenant_id, task_id)
    }

    fn list(
        &self,
        tenant_id: TenantId,
        status: Option<TaskStatus>,
        limit: usize,
    ) -> Result<Vec<Task>, TaskStoreError> {
        (**self).list(tenant_id, status, limit)
    }

    fn has_open(&self, tenant_id: TenantId, kind: &TaskKind) -> Result<bool, TaskStoreError> {
        (**self).has_open(tenant_id, kind)
    }

    fn assign(
        &self,
        tenant_id: TenantId,
        task_id: TaskId,
        assignee: UserId,
    ) -> Result<Task, TaskStoreError> {
        (**self).assign(tenant_id, task_id, assignee)
    }

    fn start(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError> {
        (**self).start(tenant_id, task_id)
    }

    fn complete(&self, tenant_id: TenantId, task_id: TaskId) -> Result<Task, TaskStoreError> {
        (**self).complete(tenant_id, task_id)
    }

    fn stats(&self, tenant_id: TenantId) -> Result<TaskStats, TaskStoreError> {
        (**self).stats(tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgewms_catalog::LocationId;
    use forgewms_tasks::TaskPriority;
    use serde_json::json;

    fn replenishment_task(tenant_id: TenantId, location_id: LocationId) -> Task {
        Task::new(
            tenant_id,
            TaskKind::replenishment(location_id),
            json!({"current": 1, "min": 5}),
        )
        .auto_generated()
    }

    #[test]
    fn open_task_lookup_matches_kind_and_location() {
        let store = InMemoryTaskStore::new();
        let tenant_id = TenantId::new();
        let location_id = LocationId::new();
        let other_location = LocationId::new();

        store
            .enqueue(replenishment_task(tenant_id, location_id))
            .unwrap();

        let kind = TaskKind::replenishment(location_id);
        assert!(store.has_open(tenant_id, &kind).unwrap());
        assert!(
            !store
                .has_open(tenant_id, &TaskKind::replenishment(other_location))
                .unwrap()
        );
        assert!(
            !store
                .has_open(tenant_id, &TaskKind::cycle_count(location_id))
                .unwrap()
        );
        // Another tenant's queue is invisible.
        assert!(!store.has_open(TenantId::new(), &kind).unwrap());
    }

    #[test]
    fn completed_task_no_longer_blocks() {
        let store = InMemoryTaskStore::new();
        let tenant_id = TenantId::new();
        let location_id = LocationId::new();
        let kind = TaskKind::replenishment(location_id);

        let id = store
            .enqueue(replenishment_task(tenant_id, location_id))
            .unwrap();
        store.start(tenant_id, id).unwrap();
        assert!(store.has_open(tenant_id, &kind).unwrap());

        store.complete(tenant_id, id).unwrap();
        assert!(!store.has_open(tenant_id, &kind).unwrap());
    }

    #[test]
    fn cross_tenant_access_is_rejected() {
        let store = InMemoryTaskStore::new();
        let tenant_id = TenantId::new();
        let id = store
            .enqueue(replenishment_task(tenant_id, LocationId::new()))
            .unwrap();

        match store.start(TenantId::new(), id) {
            Err(TaskStoreError::TenantIsolation) => {}
            other => panic!("expected TenantIsolation, got {other:?}"),
        }
    }

    #[test]
    fn rejected_transition_surfaces_the_domain_error() {
        let store = InMemoryTaskStore::new();
        let tenant_id = TenantId::new();
        let id = store
            .enqueue(replenishment_task(tenant_id, LocationId::new()))
            .unwrap();

        match store.complete(tenant_id, id) {
            Err(TaskStoreError::Rejected(DomainError::InvalidState(_))) => {}
            other => panic!("expected Rejected(InvalidState), got {other:?}"),
        }
    }

    #[test]
    fn list_orders_by_priority_then_age() {
        let store = InMemoryTaskStore::new();
        let tenant_id = TenantId::new();

        let normal = replenishment_task(tenant_id, LocationId::new());
        let urgent = replenishment_task(tenant_id, LocationId::new())
            .with_priority(TaskPriority::High);
        let normal_id = normal.id;
        let urgent_id = urgent.id;
        store.enqueue(normal).unwrap();
        store.enqueue(urgent).unwrap();

        let listed = store.list(tenant_id, None, 10).unwrap();
        assert_eq!(listed[0].id, urgent_id);
        assert_eq!(listed[1].id, normal_id);
    }
}
