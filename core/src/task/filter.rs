//! Filter predicates and sort comparators shared by task stores
//!
//! The PostgreSQL store expresses the same rules in SQL; both must agree.

use std::cmp::Ordering;

use super::model::{FilterOptions, SortField, SortOrder, Task};

/// Whether `task` passes every filter that is set
pub fn matches(task: &Task, filter: &FilterOptions) -> bool {
    if let Some(status) = filter.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if task.priority != priority {
            return false;
        }
    }
    if let Some(from) = filter.date_from {
        if task.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.date_to {
        if task.created_at > to {
            return false;
        }
    }
    true
}

/// Compare two tasks by `field` in `order`.
///
/// Tasks without a due date sort after all dated tasks in both directions.
pub fn compare(a: &Task, b: &Task, field: SortField, order: SortOrder) -> Ordering {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    match field {
        SortField::Title => directed(a.title.cmp(&b.title)),
        SortField::Priority => directed(a.priority.cmp(&b.priority)),
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => directed(left.cmp(&right)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
    }
}

/// Sort in place per `filter`, or newest first when no sort field is given
pub fn sort_tasks(tasks: &mut [Task], filter: Option<&FilterOptions>) {
    let (field, order) = match filter.and_then(|f| f.sort_field().map(|field| (field, f.order()))) {
        Some(requested) => requested,
        None => (SortField::CreatedAt, SortOrder::Desc),
    };
    tasks.sort_by(|a, b| compare(a, b, field, order));
}

/// Keep matching tasks and order them
pub fn apply<'a, I>(tasks: I, filter: Option<&FilterOptions>) -> Vec<Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut selected: Vec<Task> = tasks
        .into_iter()
        .filter(|task| filter.map_or(true, |f| matches(task, f)))
        .cloned()
        .collect();
    sort_tasks(&mut selected, filter);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status};
    use chrono::{Duration, Utc};

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn aged(title: &str, minutes_ago: i64) -> Task {
        let mut task = Task::new(title);
        task.created_at = Utc::now() - Duration::minutes(minutes_ago);
        task.updated_at = task.created_at;
        task
    }

    #[test]
    fn test_matches_combines_filters_with_and() {
        let mut task = Task::new("t").with_priority(Priority::High);
        task.status = Status::Completed;

        let filter = FilterOptions::default().with_status(Status::Completed);
        assert!(matches(&task, &filter));

        let filter = filter.with_priority(Priority::High);
        assert!(matches(&task, &filter));

        let filter = filter.with_priority(Priority::Low);
        assert!(!matches(&task, &filter));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let task = aged("t", 10);
        let at = task.created_at;

        let filter = FilterOptions::default().with_date_from(at).with_date_to(at);
        assert!(matches(&task, &filter));

        let filter = FilterOptions::default().with_date_from(at + Duration::seconds(1));
        assert!(!matches(&task, &filter));

        let filter = FilterOptions::default().with_date_to(at - Duration::seconds(1));
        assert!(!matches(&task, &filter));
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let tasks = vec![aged("old", 30), aged("new", 1), aged("mid", 10)];
        let sorted = apply(&tasks, None);
        assert_eq!(titles(&sorted), vec!["new", "mid", "old"]);

        // an order without a field still means the default
        let filter = FilterOptions {
            sort_order: "asc".to_string(),
            ..Default::default()
        };
        let sorted = apply(&tasks, Some(&filter));
        assert_eq!(titles(&sorted), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_created_at_sort_defaults_to_ascending() {
        let tasks = vec![aged("old", 30), aged("new", 1), aged("mid", 10)];
        let filter = FilterOptions {
            sort_by: "created_at".to_string(),
            ..Default::default()
        };
        let sorted = apply(&tasks, Some(&filter));
        assert_eq!(titles(&sorted), vec!["old", "mid", "new"]);
    }

    #[test]
    fn test_priority_desc() {
        let tasks = vec![
            Task::new("low").with_priority(Priority::Low),
            Task::new("high").with_priority(Priority::High),
            Task::new("medium").with_priority(Priority::Medium),
        ];
        let filter = FilterOptions::default().sorted_by(SortField::Priority, SortOrder::Desc);
        let sorted = apply(&tasks, Some(&filter));
        assert_eq!(titles(&sorted), vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_title_sort() {
        let tasks = vec![Task::new("b"), Task::new("c"), Task::new("a")];
        let filter = FilterOptions::default().sorted_by(SortField::Title, SortOrder::Asc);
        assert_eq!(titles(&apply(&tasks, Some(&filter))), vec!["a", "b", "c"]);

        let filter = FilterOptions::default().sorted_by(SortField::Title, SortOrder::Desc);
        assert_eq!(titles(&apply(&tasks, Some(&filter))), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_undated_tasks_sort_last_in_both_directions() {
        let now = Utc::now();
        let tasks = vec![
            Task::new("none-1"),
            Task::new("later").with_due_date(now + Duration::days(2)),
            Task::new("none-2"),
            Task::new("sooner").with_due_date(now + Duration::days(1)),
        ];

        let filter = FilterOptions::default().sorted_by(SortField::DueDate, SortOrder::Asc);
        let sorted = apply(&tasks, Some(&filter));
        assert_eq!(titles(&sorted)[..2], ["sooner", "later"]);
        assert!(sorted[2..].iter().all(|t| t.due_date.is_none()));

        let filter = FilterOptions::default().sorted_by(SortField::DueDate, SortOrder::Desc);
        let sorted = apply(&tasks, Some(&filter));
        assert_eq!(titles(&sorted)[..2], ["later", "sooner"]);
        assert!(sorted[2..].iter().all(|t| t.due_date.is_none()));
    }
}
