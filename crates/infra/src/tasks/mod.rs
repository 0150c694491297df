//! Work-queue storage. The scanner writes tasks here; operators walk them
//! through their lifecycle over the boundary operations.

pub mod store;

pub use store::{InMemoryTaskStore, TaskStats, TaskStore, TaskStoreError};
