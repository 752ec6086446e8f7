use std::collections::HashMap;

use shared_types::{TaskId, TaskStatus};

/// Last observed status per task, in arrival order.
///
/// Frames carry no sequence numbers, so a late frame can overwrite a newer
/// status. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    statuses: HashMap<TaskId, TaskStatus>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert; returns the status that was replaced, if any.
    pub fn record(&mut self, task_id: TaskId, status: TaskStatus) -> Option<TaskStatus> {
        self.statuses.insert(task_id, status)
    }

    pub fn status_of(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.statuses.get(task_id).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// All known tasks, sorted by id for stable display
    pub fn entries(&self) -> Vec<(TaskId, TaskStatus)> {
        let mut entries: Vec<_> = self
            .statuses
            .iter()
            .map(|(id, status)| (id.clone(), *status))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
