//! `forgewms-tasks` — work-queue records emitted by the scanner and consumed
//! by operators, plus the cycle-count selection rules.

pub mod scan;
pub mod task;

pub use scan::{CycleCountRun, CycleCountRunId, CycleCountStrategy, LocationStock, select_locations};
pub use task::{Task, TaskId, TaskKind, TaskPriority, TaskStatus};
