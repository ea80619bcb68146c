//! Task persistence.
//!
//! All reads and writes of `tasks` rows go through [`TaskStore`]. Each call
//! acquires the database from the injected provider, so an uninitialised
//! store fails every operation with [`Error::NotInitialized`].

use crate::error::{Error, Result};
use crate::model::{
    DEFAULT_USER_ID, NewTask, Task, TaskPage, TaskQuery, TaskStats, TaskStatus, TaskUpdate,
};
use crate::storage::handle::ConnectionProvider;
use crate::storage::query::{Assignments, Param, Predicates, as_params};
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, category, \
     email_id, one_line_summary, due_date, created_at, updated_at, completed_at";

/// Store for task records.
#[derive(Clone)]
pub struct TaskStore {
    provider: Arc<dyn ConnectionProvider>,
}

impl TaskStore {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    /// Insert a task and return it as persisted.
    ///
    /// Omitted status/priority default to `pending`/`medium`. Timestamps are
    /// always stamped here, never taken from the caller. `completed_at` is
    /// only ever stamped by [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, or a database error if the insert fails.
    pub fn create(&self, task: &NewTask) -> Result<Task> {
        let db = self.provider.acquire()?;
        let now = chrono::Utc::now().timestamp_millis();
        let status = task.status.unwrap_or_default();
        let priority = task.priority.unwrap_or_default();

        let id = db.mutate("create_task", |tx| {
            tx.execute(
                "INSERT INTO tasks (user_id, title, description, status, priority, category, email_id, one_line_summary, due_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                rusqlite::params![
                    DEFAULT_USER_ID,
                    task.title,
                    task.description,
                    status,
                    priority,
                    task.category,
                    task.email_id,
                    task.one_line_summary,
                    task.due_date,
                    now
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        debug!(id, "Created task");
        self.get_by_id(id)
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if no row has this ID.
    pub fn get_by_id(&self, id: i64) -> Result<Task> {
        let db = self.provider.acquire()?;
        db.with_conn(|conn| fetch_task(conn, id))
    }

    /// List one page of tasks matching the filter, newest first.
    ///
    /// `total` counts every task matching the filter, not just this page.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero limit, or a database error.
    pub fn list(&self, query: &TaskQuery) -> Result<TaskPage> {
        let db = self.provider.acquire()?;
        if query.limit == 0 {
            return Err(Error::Validation("limit must be at least 1".to_string()));
        }

        let mut preds = Predicates::new();
        if let Some(status) = query.status {
            preds.push("status = ?", status);
        }
        if let Some(priority) = query.priority {
            preds.push("priority = ?", priority);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            // Plain LIKE: wildcards in the search text stay live.
            let pattern = format!("%{search}%");
            preds.push_many(
                "(title LIKE ? OR description LIKE ?)",
                vec![Box::new(pattern.clone()), Box::new(pattern)],
            );
        }

        let where_clause = preds.where_clause();
        let page = query.page.max(1);
        let offset = i64::from(page - 1) * i64::from(query.limit);

        db.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM tasks{where_clause}"),
                as_params(preds.params()).as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM tasks{where_clause}
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            );
            let mut params: Vec<Param> = preds.into_params();
            params.push(Box::new(i64::from(query.limit)));
            params.push(Box::new(offset));

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(as_params(&params).as_slice(), map_task_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(TaskPage { tasks, total })
        })
    }

    /// Apply a partial update and return the row as persisted.
    ///
    /// `updated_at` is always refreshed, even for an empty update. Setting
    /// status to `completed` stamps `completed_at` in the same statement.
    /// An unknown ID surfaces as `TaskNotFound` from the read-back.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if the ID does not exist.
    pub fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task> {
        let db = self.provider.acquire()?;
        let sets = assignments_for(update, chrono::Utc::now().timestamp_millis());

        db.mutate("update_task", |tx| {
            let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.set_clause());
            let mut params = as_params(sets.params());
            params.push(&id);
            tx.execute(&sql, params.as_slice())?;
            Ok(())
        })?;

        debug!(id, "Updated task");
        self.get_by_id(id)
    }

    /// Hard-delete a task.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if no row was deleted.
    pub fn delete(&self, id: i64) -> Result<()> {
        let db = self.provider.acquire()?;
        db.mutate("delete_task", |tx| {
            let rows = tx.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            if rows == 0 {
                return Err(Error::TaskNotFound { id });
            }
            Ok(())
        })?;

        debug!(id, "Deleted task");
        Ok(())
    }

    /// Apply the same partial update to every ID, atomically.
    ///
    /// An empty list is a successful no-op. If any ID is missing or any
    /// statement fails, nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the whole batch is rolled back.
    pub fn bulk_update(&self, ids: &[i64], update: &TaskUpdate) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let db = self.provider.acquire()?;
        let sets = assignments_for(update, chrono::Utc::now().timestamp_millis());
        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.set_clause());

        let updated = db.mutate("bulk_update_tasks", |tx| {
            let mut stmt = tx.prepare(&sql)?;
            for id in ids {
                let mut params = as_params(sets.params());
                params.push(id);
                if stmt.execute(params.as_slice())? == 0 {
                    return Err(Error::TaskNotFound { id: *id });
                }
            }
            Ok(ids.len())
        })?;

        debug!(count = updated, "Bulk updated tasks");
        Ok(updated)
    }

    /// Delete every ID, atomically.
    ///
    /// An empty list is a successful no-op. If any ID is missing, nothing
    /// is deleted.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the whole batch is rolled back.
    pub fn bulk_delete(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let db = self.provider.acquire()?;

        let deleted = db.mutate("bulk_delete_tasks", |tx| {
            let mut stmt = tx.prepare("DELETE FROM tasks WHERE id = ?1")?;
            for id in ids {
                if stmt.execute([id])? == 0 {
                    return Err(Error::TaskNotFound { id: *id });
                }
            }
            Ok(ids.len())
        })?;

        debug!(count = deleted, "Bulk deleted tasks");
        Ok(deleted)
    }

    /// Aggregate counts by status, priority and category, plus overdue.
    ///
    /// Overdue is evaluated now against the current status: completed
    /// tasks never count, whatever their due date.
    ///
    /// # Errors
    ///
    /// Returns a database error if any aggregate query fails.
    pub fn stats(&self) -> Result<TaskStats> {
        let db = self.provider.acquire()?;
        let now = chrono::Utc::now().timestamp_millis();

        db.with_conn(|conn| {
            let total_tasks: i64 =
                conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;

            let by_status = count_grouped(
                conn,
                "SELECT status, COUNT(*) FROM tasks GROUP BY status",
            )?;
            let by_priority = count_grouped(
                conn,
                "SELECT priority, COUNT(*) FROM tasks GROUP BY priority",
            )?;
            let by_category = count_grouped(
                conn,
                "SELECT category, COUNT(*) FROM tasks
                 WHERE category IS NOT NULL AND category != '' GROUP BY category",
            )?;

            let overdue_tasks: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks
                 WHERE status != ?1 AND due_date IS NOT NULL AND due_date < ?2",
                rusqlite::params![TaskStatus::Completed, now],
                |row| row.get(0),
            )?;

            Ok(TaskStats {
                total_tasks,
                by_status,
                by_priority,
                by_category,
                overdue_tasks,
            })
        })
    }

    /// Tasks linked to an email, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_by_email_id(&self, email_id: &str) -> Result<Vec<Task>> {
        self.list_where("email_id = ?1", email_id)
    }

    /// Tasks in a category, newest first.
    ///
    /// An empty category matches nothing rather than everything.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub fn list_by_category(&self, category: &str) -> Result<Vec<Task>> {
        if category.is_empty() {
            // Still report an uninitialised store.
            self.provider.acquire()?;
            return Ok(Vec::new());
        }
        self.list_where("category = ?1", category)
    }

    fn list_where(&self, predicate: &'static str, value: &str) -> Result<Vec<Task>> {
        let db = self.provider.acquire()?;
        db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE {predicate}
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let tasks = stmt
                .query_map([value], map_task_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
    }
}

/// SET clause for a partial update: `updated_at` always, then present fields.
fn assignments_for(update: &TaskUpdate, now: i64) -> Assignments {
    let mut sets = Assignments::new();
    sets.set("updated_at", now);
    sets.set_opt("title", update.title.clone());
    sets.set_opt("description", update.description.clone());
    sets.set_opt("status", update.status);
    sets.set_opt("priority", update.priority);
    sets.set_opt("category", update.category.clone());
    sets.set_opt("email_id", update.email_id.clone());
    sets.set_opt("one_line_summary", update.one_line_summary.clone());
    sets.set_opt("due_date", update.due_date);

    // TODO: decide with product whether moving away from completed should clear completed_at
    if update.status == Some(TaskStatus::Completed) {
        sets.set("completed_at", now);
    }
    sets
}

fn fetch_task(conn: &Connection, id: i64) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        map_task_row,
    )
    .optional()?
    .ok_or(Error::TaskNotFound { id })
}

fn count_grouped(conn: &Connection, sql: &str) -> Result<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    Ok(rows.collect::<std::result::Result<BTreeMap<_, _>, _>>()?)
}

/// Map a row to a Task.
///
/// `description`/`category` coerce NULL to an empty string; the remaining
/// nullable columns stay `None`.
fn map_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        status: row.get(4)?,
        priority: row.get(5)?,
        category: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        email_id: row.get(7)?,
        one_line_summary: row.get(8)?,
        due_date: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        completed_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPriority;
    use crate::storage::StorageHandle;

    fn store() -> TaskStore {
        let handle = StorageHandle::open_in_memory().unwrap();
        TaskStore::new(Arc::new(handle))
    }

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    #[test]
    fn test_create_applies_defaults() {
        let store = store();
        let task = store.create(&NewTask::new("Ship report")).unwrap();

        assert!(task.id > 0);
        assert_eq!(task.title, "Ship report");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.user_id, DEFAULT_USER_ID);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_null_coercion_asymmetry() {
        let store = store();
        let task = store.create(&NewTask::new("Bare")).unwrap();

        assert_eq!(task.description, "");
        assert_eq!(task.category, "");
        assert!(task.email_id.is_none());
        assert!(task.one_line_summary.is_none());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let store = store();
        let a = store.create(&NewTask::new("a")).unwrap();
        let b = store.create(&NewTask::new("b")).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = store();
        assert!(matches!(
            store.get_by_id(999),
            Err(Error::TaskNotFound { id: 999 })
        ));
    }

    #[test]
    fn test_task_lifecycle_scenario() {
        let store = store();
        let task = store.create(&NewTask::new("Ship report")).unwrap();

        let done = store
            .update(task.id, &TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        let completed_at = done.completed_at.expect("completed_at should be stamped");
        let now = chrono::Utc::now().timestamp_millis();
        assert!(completed_at > 0 && now - completed_at < 60_000);

        store.delete(task.id).unwrap();
        assert!(matches!(
            store.get_by_id(task.id),
            Err(Error::TaskNotFound { .. })
        ));
    }

    #[test]
    fn test_create_completed_does_not_stamp() {
        let store = store();
        let task = store
            .create(&NewTask::new("born done").with_status(TaskStatus::Completed))
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_none());

        let done = store
            .update(task.id, &TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        assert!(done.completed_at.is_some());
    }

    #[test]
    fn test_non_completed_status_does_not_stamp() {
        let store = store();
        let task = store.create(&NewTask::new("t")).unwrap();
        let wip = store
            .update(task.id, &TaskUpdate::status(TaskStatus::InProgress))
            .unwrap();
        assert!(wip.completed_at.is_none());
    }

    #[test]
    fn test_completed_at_survives_reopen() {
        let store = store();
        let task = store.create(&NewTask::new("t")).unwrap();
        store
            .update(task.id, &TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        let reopened = store
            .update(task.id, &TaskUpdate::status(TaskStatus::Pending))
            .unwrap();
        assert_eq!(reopened.status, TaskStatus::Pending);
        assert!(reopened.completed_at.is_some());
    }

    #[test]
    fn test_empty_update_touches_updated_at() {
        let store = store();
        let task = store.create(&NewTask::new("t")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let touched = store.update(task.id, &TaskUpdate::default()).unwrap();
        assert!(touched.updated_at > task.updated_at);
        assert_eq!(touched.created_at, task.created_at);
        assert_eq!(touched.title, task.title);
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let store = store();
        let task = store
            .create(
                &NewTask::new("t")
                    .with_description("keep me")
                    .with_priority(TaskPriority::High),
            )
            .unwrap();

        let updated = store
            .update(
                task.id,
                &TaskUpdate {
                    title: Some("renamed".into()),
                    ..TaskUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "keep me");
        assert_eq!(updated.priority, TaskPriority::High);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = store();
        assert!(matches!(
            store.update(42, &TaskUpdate::status(TaskStatus::Completed)),
            Err(Error::TaskNotFound { id: 42 })
        ));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = store();
        assert!(matches!(
            store.delete(7),
            Err(Error::TaskNotFound { id: 7 })
        ));
    }

    #[test]
    fn test_list_pagination_scenario() {
        let store = store();
        for title in ["one", "two", "three"] {
            store.create(&NewTask::new(title)).unwrap();
        }

        let first = store.list(&TaskQuery::page(1, 2)).unwrap();
        assert_eq!(first.tasks.len(), 2);
        assert_eq!(first.total, 3);

        let second = store.list(&TaskQuery::page(2, 2)).unwrap();
        assert_eq!(second.tasks.len(), 1);
        assert_eq!(second.total, 3);
    }

    #[test]
    fn test_pages_partition_filtered_sequence() {
        let store = store();
        for i in 0..7 {
            let status = if i % 2 == 0 {
                TaskStatus::Pending
            } else {
                TaskStatus::InProgress
            };
            store
                .create(&NewTask::new(format!("task {i}")).with_status(status))
                .unwrap();
        }

        let filter = |page| TaskQuery {
            page,
            limit: 3,
            status: Some(TaskStatus::Pending),
            ..TaskQuery::default()
        };

        let everything = store
            .list(&TaskQuery {
                limit: 100,
                ..filter(1)
            })
            .unwrap();
        assert_eq!(everything.total, 4);

        let mut seen = Vec::new();
        for page in 1..=2 {
            let result = store.list(&filter(page)).unwrap();
            assert_eq!(result.total, 4);
            seen.extend(result.tasks.into_iter().map(|t| t.id));
        }
        let expected: Vec<i64> = everything.tasks.iter().map(|t| t.id).collect();
        assert_eq!(seen, expected);

        // newest first
        assert!(expected.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_list_search_title_or_description() {
        let store = store();
        store.create(&NewTask::new("Invoice Q3")).unwrap();
        store
            .create(&NewTask::new("Call Bob").with_description("about the invoice"))
            .unwrap();
        store.create(&NewTask::new("Unrelated")).unwrap();

        let result = store
            .list(&TaskQuery {
                search: Some("invoice".into()),
                ..TaskQuery::default()
            })
            .unwrap();
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_list_search_keeps_like_wildcards() {
        let store = store();
        store.create(&NewTask::new("500 units")).unwrap();
        store.create(&NewTask::new("file_name cleanup")).unwrap();

        let percent = store
            .list(&TaskQuery {
                search: Some("50%".into()),
                ..TaskQuery::default()
            })
            .unwrap();
        assert_eq!(percent.total, 1);
        assert_eq!(percent.tasks[0].title, "500 units");

        let underscore = store
            .list(&TaskQuery {
                search: Some("file_".into()),
                ..TaskQuery::default()
            })
            .unwrap();
        assert_eq!(underscore.total, 1);
    }

    #[test]
    fn test_list_filters_are_conjunctive() {
        let store = store();
        store
            .create(&NewTask::new("a").with_priority(TaskPriority::High))
            .unwrap();
        store
            .create(
                &NewTask::new("b")
                    .with_priority(TaskPriority::High)
                    .with_status(TaskStatus::Completed),
            )
            .unwrap();

        let result = store
            .list(&TaskQuery {
                status: Some(TaskStatus::Pending),
                priority: Some(TaskPriority::High),
                ..TaskQuery::default()
            })
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.tasks[0].title, "a");
    }

    #[test]
    fn test_list_zero_limit_is_validation() {
        let store = store();
        assert!(matches!(
            store.list(&TaskQuery::page(1, 0)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_bulk_empty_is_noop() {
        let store = store();
        assert_eq!(store.bulk_update(&[], &TaskUpdate::default()).unwrap(), 0);
        assert_eq!(store.bulk_delete(&[]).unwrap(), 0);
    }

    #[test]
    fn test_bulk_update_applies_to_all() {
        let store = store();
        let a = store.create(&NewTask::new("a")).unwrap();
        let b = store.create(&NewTask::new("b")).unwrap();

        let n = store
            .bulk_update(&[a.id, b.id], &TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        assert_eq!(n, 2);
        for id in [a.id, b.id] {
            let t = store.get_by_id(id).unwrap();
            assert_eq!(t.status, TaskStatus::Completed);
            assert!(t.completed_at.is_some());
        }
    }

    #[test]
    fn test_bulk_update_is_atomic() {
        let store = store();
        let a = store.create(&NewTask::new("a")).unwrap();

        let result = store.bulk_update(&[a.id, 9999], &TaskUpdate::priority(TaskPriority::Urgent));
        assert!(matches!(result, Err(Error::TaskNotFound { id: 9999 })));
        assert_eq!(store.get_by_id(a.id).unwrap().priority, TaskPriority::Medium);
    }

    #[test]
    fn test_bulk_delete_is_atomic() {
        let store = store();
        let a = store.create(&NewTask::new("a")).unwrap();

        assert!(store.bulk_delete(&[a.id, 9999]).is_err());
        assert!(store.get_by_id(a.id).is_ok());

        assert_eq!(store.bulk_delete(&[a.id]).unwrap(), 1);
        assert!(store.get_by_id(a.id).is_err());
    }

    #[test]
    fn test_stats_counts_and_overdue() {
        let store = store();
        let past = chrono::Utc::now().timestamp_millis() - DAY_MS;
        let future = chrono::Utc::now().timestamp_millis() + DAY_MS;

        let late = store
            .create(&NewTask::new("late").with_due_date(past).with_category("work"))
            .unwrap();
        store
            .create(&NewTask::new("later").with_due_date(future).with_category("work"))
            .unwrap();
        store
            .create(&NewTask::new("urgent").with_priority(TaskPriority::Urgent))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.by_status.get("pending"), Some(&3));
        assert_eq!(stats.by_priority.get("medium"), Some(&2));
        assert_eq!(stats.by_priority.get("urgent"), Some(&1));
        assert_eq!(stats.by_category.get("work"), Some(&2));
        assert_eq!(stats.by_category.len(), 1);
        assert_eq!(stats.overdue_tasks, 1);

        store
            .update(late.id, &TaskUpdate::status(TaskStatus::Completed))
            .unwrap();
        assert_eq!(store.stats().unwrap().overdue_tasks, 0);
    }

    #[test]
    fn test_list_by_email_and_category() {
        let store = store();
        store
            .create(&NewTask::new("reply").with_email("msg-1").with_category("work"))
            .unwrap();
        store
            .create(&NewTask::new("follow up").with_email("msg-1"))
            .unwrap();
        store
            .create(&NewTask::new("other").with_email("msg-2"))
            .unwrap();

        let linked = store.list_by_email_id("msg-1").unwrap();
        assert_eq!(linked.len(), 2);
        assert_eq!(linked[0].title, "follow up");

        assert_eq!(store.list_by_category("work").unwrap().len(), 1);
        assert!(store.list_by_category("").unwrap().is_empty());
    }

    #[test]
    fn test_uninitialized_store_reports_not_initialized() {
        let store = TaskStore::new(Arc::new(StorageHandle::new()));
        assert!(matches!(
            store.create(&NewTask::new("x")),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(store.get_by_id(1), Err(Error::NotInitialized)));
        assert!(matches!(
            store.list(&TaskQuery::page(1, 0)),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            store.list(&TaskQuery::default()),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(store.stats(), Err(Error::NotInitialized)));
        assert!(matches!(
            store.list_by_category(""),
            Err(Error::NotInitialized)
        ));
        // Empty bulk calls succeed without touching storage.
        assert!(store.bulk_delete(&[]).is_ok());
    }
}
