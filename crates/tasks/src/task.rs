use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::LocationId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId, impl_uuid_newtype};

/// Task identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl_uuid_newtype!(TaskId, "TaskId");

/// Task kind for routing to the right operator queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Refill a location that fell below its policy minimum.
    Replenishment { location_id: LocationId },
    /// Physically count one location.
    CycleCount { location_id: LocationId },
    /// Manually raised work.
    Custom { kind: String },
}

impl TaskKind {
    pub fn replenishment(location_id: LocationId) -> Self {
        Self::Replenishment { location_id }
    }

    pub fn cycle_count(location_id: LocationId) -> Self {
        Self::CycleCount { location_id }
    }

    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom { kind: kind.into() }
    }

    pub fn type_name(&self) -> &str {
        match self {
            TaskKind::Replenishment { .. } => "replenishment",
            TaskKind::CycleCount { .. } => "cycle_count",
            TaskKind::Custom { kind } => kind,
        }
    }

    /// The location this task references, if any.
    pub fn location_id(&self) -> Option<LocationId> {
        match self {
            TaskKind::Replenishment { location_id } | TaskKind::CycleCount { location_id } => {
                Some(*location_id)
            }
            TaskKind::Custom { .. } => None,
        }
    }
}

/// Task lifecycle. The core creates and reads tasks; operators walk them
/// Pending -> InProgress -> Done through the boundary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Open tasks block duplicate replenishment generation.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// A unit of warehouse work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: TaskId,
    /// Tenant scope
    pub tenant_id: TenantId,
    /// Kind for routing
    pub kind: TaskKind,
    /// Current status
    pub status: TaskStatus,
    /// Queue ordering hint
    pub priority: TaskPriority,
    /// Operator the task is assigned to, if any
    pub assignee: Option<UserId>,
    /// JSON payload (e.g. the current/min/max snapshot for replenishment)
    pub metadata: serde_json::Value,
    /// True when the scanner created it, false for manual tasks
    pub auto_generated: bool,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(tenant_id: TenantId, kind: TaskKind, metadata: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            tenant_id,
            kind,
            status: TaskStatus::Pending,
            priority: TaskPriority::default(),
            assignee: None,
            metadata,
            auto_generated: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as scanner-generated.
    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn assign(&mut self, assignee: UserId) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "task {} is already done",
                self.id
            )));
        }
        self.assignee = Some(assignee);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn start(&mut self) -> DomainResult<()> {
        if self.status != TaskStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "task {} cannot start from {:?}",
                self.id, self.status
            )));
        }
        self.status = TaskStatus::InProgress;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete(&mut self) -> DomainResult<()> {
        if self.status != TaskStatus::InProgress {
            return Err(DomainError::invalid_state(format!(
                "task {} cannot complete from {:?}",
                self.id, self.status
            )));
        }
        self.status = TaskStatus::Done;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_task() -> Task {
        Task::new(
            TenantId::new(),
            TaskKind::replenishment(LocationId::new()),
            json!({"current": 2, "min": 10}),
        )
    }

    #[test]
    fn lifecycle_walks_pending_in_progress_done() {
        let mut task = test_task();
        assert!(task.status.is_open());

        task.assign(UserId::new()).unwrap();
        task.start().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.status.is_open());

        task.complete().unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert!(!task.status.is_open());
    }

    #[test]
    fn cannot_start_twice() {
        let mut task = test_task();
        task.start().unwrap();
        match task.start().unwrap_err() {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState when starting twice"),
        }
    }

    #[test]
    fn cannot_complete_before_start() {
        let mut task = test_task();
        match task.complete().unwrap_err() {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState when completing a pending task"),
        }
    }

    #[test]
    fn cannot_assign_a_done_task() {
        let mut task = test_task();
        task.start().unwrap();
        task.complete().unwrap();
        match task.assign(UserId::new()).unwrap_err() {
            DomainError::InvalidState(_) => {}
            _ => panic!("Expected InvalidState when assigning a done task"),
        }
    }

    #[test]
    fn kind_exposes_referenced_location() {
        let location_id = LocationId::new();
        assert_eq!(
            TaskKind::replenishment(location_id).location_id(),
            Some(location_id)
        );
        assert_eq!(TaskKind::custom("relabel").location_id(), None);
        assert_eq!(TaskKind::custom("relabel").type_name(), "relabel");
    }
}
