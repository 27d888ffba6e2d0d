//! Advisory per-day task counter kept in browser storage.
//!
//! Nothing here blocks an upload: the counter only decides whether a warning
//! is shown when the page loads.

use crate::config::DAILY_TASK_LIMIT;

pub const LAST_VISIT_KEY: &str = "lastVisit";
pub const TASKS_DONE_KEY: &str = "tasksDone";

/// Key-value storage the counter lives in (`localStorage` in the browser).
pub trait UsageStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First load on this date; the counter was reset.
    NewDay,
    SameDay { tasks_done: u32 },
}

impl Visit {
    pub fn limit_reached(&self) -> bool {
        match self {
            Self::NewDay => false,
            Self::SameDay { tasks_done } => *tasks_done >= DAILY_TASK_LIMIT,
        }
    }
}

fn tasks_done(store: &impl UsageStore) -> u32 {
    store
        .get(TASKS_DONE_KEY)
        .and_then(|count| count.trim().parse().ok())
        .unwrap_or(0)
}

/// Compares the stored visit date with `today` and resets the counter when
/// they differ.
pub fn check_visit(store: &impl UsageStore, today: &str) -> Visit {
    if store.get(LAST_VISIT_KEY).as_deref() == Some(today) {
        Visit::SameDay {
            tasks_done: tasks_done(store),
        }
    } else {
        store.set(LAST_VISIT_KEY, today);
        store.set(TASKS_DONE_KEY, "0");
        Visit::NewDay
    }
}

/// Counts one finished task for `today`, returning the new total.
pub fn record_task(store: &impl UsageStore, today: &str) -> u32 {
    let count = if store.get(LAST_VISIT_KEY).as_deref() == Some(today) {
        tasks_done(store).saturating_add(1)
    } else {
        store.set(LAST_VISIT_KEY, today);
        1
    };
    store.set(TASKS_DONE_KEY, &count.to_string());
    count
}
