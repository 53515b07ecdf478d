use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::due::extract_due_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub created_at: DateTime<Local>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub due_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Build a fresh task. The due date is read from the raw description once,
    /// here, and never recomputed.
    pub fn new(id: u32, description: impl Into<String>, created_at: DateTime<Local>) -> Self {
        let description = description.into();
        let due_at = extract_due_date(&description);
        Self {
            id,
            description,
            created_at,
            completed_at: None,
            due_at,
            done: false,
        }
    }

    pub fn mark_done(&mut self, at: DateTime<Local>) {
        self.done = true;
        self.completed_at = Some(at);
    }

    pub fn is_overdue(&self, now: DateTime<Local>) -> bool {
        !self.done && self.due_at.map(|due| due < now).unwrap_or(false)
    }
}

/// Ordered task collection in storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn new_task_extracts_due_date_from_description() {
        let created = Local::now();
        let task = Task::new(1, "pay rent @due:2030-05-01", created);
        let expected = Local
            .with_ymd_and_hms(2030, 5, 1, 0, 0, 0)
            .earliest()
            .expect("local midnight");
        assert_eq!(task.due_at, Some(expected));
        assert!(!task.done);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn mark_done_restamps_completion_time() {
        let created = Local::now();
        let mut task = Task::new(1, "water plants", created);
        let first = created + Duration::minutes(5);
        let second = created + Duration::minutes(10);
        task.mark_done(first);
        task.mark_done(second);
        assert!(task.done);
        assert_eq!(task.completed_at, Some(second));
    }

    #[test]
    fn overdue_requires_pending_task_with_past_due_date() {
        let now = Local::now();
        let mut task = Task::new(1, "file taxes @due:2001-04-15", now);
        assert!(task.is_overdue(now));
        task.mark_done(now);
        assert!(!task.is_overdue(now));

        let no_due = Task::new(2, "someday", now);
        assert!(!no_due.is_overdue(now));
    }
}
