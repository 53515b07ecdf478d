use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::Task;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown sort key '{0}' (expected created, completed or due)")]
    UnknownSortKey(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Created,
    Completed,
    Due,
}

impl FromStr for SortKey {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created" => Ok(SortKey::Created),
            "completed" => Ok(SortKey::Completed),
            "due" => Ok(SortKey::Due),
            other => Err(ViewError::UnknownSortKey(other.to_string())),
        }
    }
}

/// List filters. Every enabled flag must hold for a task to be kept.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Pending tasks that carry a due date.
    pub due: bool,
    pub completed: bool,
    pub pending: bool,
}

impl ListFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.due && (task.due_at.is_none() || task.done) {
            return false;
        }
        if self.completed && !task.done {
            return false;
        }
        if self.pending && task.done {
            return false;
        }
        true
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Done,
    Overdue,
    Open,
}

impl TaskStatus {
    pub fn marker(&self) -> &'static str {
        match self {
            TaskStatus::Done => "[x]",
            TaskStatus::Overdue => "[*]",
            TaskStatus::Open => "[ ]",
        }
    }
}

pub fn task_status(task: &Task, now: DateTime<Local>) -> TaskStatus {
    if task.done {
        TaskStatus::Done
    } else if task.is_overdue(now) {
        TaskStatus::Overdue
    } else {
        TaskStatus::Open
    }
}

/// Whole days elapsed since the task was created.
pub fn age_days(task: &Task, now: DateTime<Local>) -> i64 {
    (now - task.created_at).num_seconds() / SECONDS_PER_DAY
}

/// Present values ascend; missing values go last and keep their relative order.
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Completed => cmp_present_first(
            a.completed_at.filter(|_| a.done),
            b.completed_at.filter(|_| b.done),
        ),
        SortKey::Due => cmp_present_first(a.due_at, b.due_at),
    }
}

/// Stable sort, so ties keep storage order.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    tasks.sort_by(|a, b| compare(a, b, key));
}

pub fn select<'a>(tasks: &'a [Task], filter: &ListFilter, sort: Option<SortKey>) -> Vec<&'a Task> {
    let mut selected: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();
    if let Some(key) = sort {
        sort_tasks(&mut selected, key);
    }
    selected
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
    pub overdue: usize,
    pub next_due: Option<DateTime<Local>>,
}

pub fn compute_stats(tasks: &[Task], now: DateTime<Local>) -> Stats {
    let total = tasks.len();
    let done = tasks.iter().filter(|task| task.done).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(now)).count();
    let next_due = tasks
        .iter()
        .filter(|task| !task.done)
        .filter_map(|task| task.due_at)
        .min();
    Stats {
        total,
        done,
        pending: total - done,
        overdue,
        next_due,
    }
}
