use chrono::{DateTime, Local};
use serde::Serialize;

use crate::task::{Task, TaskList};

pub const DEFAULT_MAX_TASKS: usize = 1024;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    pub added: Vec<Task>,
    /// Set when the list filled up (or ran out of ids) before every
    /// description was added.
    pub limit_reached: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdOutcome {
    Applied(u32),
    NotFound(u32),
}

/// The next id is one past the id of the last stored task, not the largest id
/// present. The two only agree while storage order matches id order, which
/// `remove` keeps true by renumbering.
///
/// `None` when the last id is already `u32::MAX`; there is no id left to hand out.
pub fn next_id(list: &TaskList) -> Option<u32> {
    match list.tasks().last() {
        Some(task) => task.id.checked_add(1),
        None => Some(1),
    }
}

pub fn add<I, S>(list: &mut TaskList, descriptions: I, now: DateTime<Local>, max_tasks: usize) -> AddReport
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut report = AddReport::default();
    for description in descriptions {
        let id = match next_id(list) {
            Some(id) if list.len() < max_tasks => id,
            _ => {
                report.limit_reached = true;
                break;
            }
        };
        let task = Task::new(id, description, now);
        list.tasks_mut().push(task.clone());
        report.added.push(task);
    }
    report
}

pub fn mark_done(list: &mut TaskList, ids: &[u32], now: DateTime<Local>) -> Vec<IdOutcome> {
    ids.iter()
        .map(|&id| match list.tasks_mut().iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.mark_done(now);
                IdOutcome::Applied(id)
            }
            None => IdOutcome::NotFound(id),
        })
        .collect()
}

/// Ids refer to the numbering before the call; renumbering happens once,
/// after the whole batch.
pub fn remove(list: &mut TaskList, ids: &[u32]) -> Vec<IdOutcome> {
    let outcomes: Vec<IdOutcome> = ids
        .iter()
        .map(|&id| {
            let tasks = list.tasks_mut();
            match tasks.iter().position(|task| task.id == id) {
                Some(idx) => {
                    tasks.remove(idx);
                    IdOutcome::Applied(id)
                }
                None => IdOutcome::NotFound(id),
            }
        })
        .collect();
    renumber(list);
    outcomes
}

pub fn renumber(list: &mut TaskList) {
    for (idx, task) in list.tasks_mut().iter_mut().enumerate() {
        task.id = idx as u32 + 1;
    }
}

/// Case-insensitive substring match over the raw description, markers included.
pub fn search<'a>(list: &'a TaskList, keyword: &str) -> Vec<&'a Task> {
    let needle = keyword.to_lowercase();
    list.iter()
        .filter(|task| task.description.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &TaskList) -> Vec<u32> {
        list.iter().map(|task| task.id).collect()
    }

    fn seeded(descriptions: &[&str]) -> TaskList {
        let mut list = TaskList::new();
        add(&mut list, descriptions.iter().copied(), Local::now(), DEFAULT_MAX_TASKS);
        list
    }

    #[test]
    fn add_assigns_sequential_ids_from_one() {
        let list = seeded(&["a", "b", "c"]);
        assert_eq!(ids(&list), vec![1, 2, 3]);
    }

    #[test]
    fn next_id_follows_last_task_not_maximum() {
        let now = Local::now();
        let list = TaskList::from_tasks(vec![Task::new(7, "late", now), Task::new(3, "early", now)]);
        assert_eq!(next_id(&list), Some(4));
        assert_eq!(next_id(&TaskList::new()), Some(1));
    }

    #[test]
    fn add_after_largest_possible_id_reports_limit_instead_of_overflowing() {
        let now = Local::now();
        let mut list = TaskList::from_tasks(vec![Task::new(u32::MAX, "edited by hand", now)]);
        assert_eq!(next_id(&list), None);
        let before = list.clone();
        let report = add(&mut list, ["y"], now, DEFAULT_MAX_TASKS);
        assert!(report.limit_reached);
        assert!(report.added.is_empty());
        assert_eq!(list, before);
    }

    #[test]
    fn add_stops_at_capacity_and_keeps_earlier_additions() {
        let mut list = seeded(&["a"]);
        let report = add(&mut list, ["b", "c", "d"], Local::now(), 2);
        assert!(report.limit_reached);
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].description, "b");
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn add_at_capacity_adds_nothing() {
        let mut list = seeded(&["a", "b"]);
        let before = list.clone();
        let report = add(&mut list, ["x", "y"], Local::now(), 2);
        assert!(report.limit_reached);
        assert!(report.added.is_empty());
        assert_eq!(list, before);
    }

    #[test]
    fn mark_done_reports_each_id_independently() {
        let mut list = seeded(&["a", "b"]);
        let now = Local::now();
        let outcomes = mark_done(&mut list, &[2, 9, 1], now);
        assert_eq!(
            outcomes,
            vec![IdOutcome::Applied(2), IdOutcome::NotFound(9), IdOutcome::Applied(1)]
        );
        assert!(list.iter().all(|task| task.done && task.completed_at == Some(now)));
    }

    #[test]
    fn remove_renumbers_after_the_whole_batch() {
        let mut list = seeded(&["a", "b", "c", "d"]);
        let outcomes = remove(&mut list, &[2, 3, 42]);
        assert_eq!(
            outcomes,
            vec![IdOutcome::Applied(2), IdOutcome::Applied(3), IdOutcome::NotFound(42)]
        );
        let descriptions: Vec<&str> = list.iter().map(|task| task.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "d"]);
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn remove_with_only_missing_ids_still_renumbers() {
        let now = Local::now();
        let mut list = TaskList::from_tasks(vec![Task::new(4, "x", now), Task::new(9, "y", now)]);
        let outcomes = remove(&mut list, &[1]);
        assert_eq!(outcomes, vec![IdOutcome::NotFound(1)]);
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn search_is_case_insensitive_and_sees_markers() {
        let list = seeded(&["Buy MILK", "call mom @due:2030-01-01", "milkshake"]);
        let hits: Vec<u32> = search(&list, "milk").iter().map(|task| task.id).collect();
        assert_eq!(hits, vec![1, 3]);
        let due_hits: Vec<u32> = search(&list, "@DUE:2030").iter().map(|task| task.id).collect();
        assert_eq!(due_hits, vec![2]);
        assert!(search(&list, "nothing").is_empty());
    }
}
