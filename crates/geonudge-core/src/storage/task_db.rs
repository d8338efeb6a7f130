//! SQLite-based task storage.
//!
//! The store exclusively owns task records and their status transitions.
//! The trigger engine requests mutations through [`TaskDb::claim_pending`]
//! (conditional `pending → triggered`) and never writes status directly,
//! which keeps concurrent passes over overlapping task sets from
//! double-firing the same task.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::data_dir;
use crate::error::StoreError;
use crate::task::{Category, Priority, Task, TaskStatus};

// === Helper Functions ===

/// Parse category from database string
fn parse_category(category_str: &str) -> Category {
    Category::parse(category_str).unwrap_or(Category::General)
}

/// Parse priority from database string
fn parse_priority(priority_str: &str) -> Priority {
    Priority::parse(priority_str).unwrap_or(Priority::Medium)
}

/// Parse status from database string
fn parse_status(status_str: &str) -> TaskStatus {
    match status_str {
        "triggered" => TaskStatus::Triggered,
        _ => TaskStatus::Pending,
    }
}

/// Format status for database storage
fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Triggered => "triggered",
    }
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a Task from a database row
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let category_str: String = row.get(2)?;
    let priority_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let triggered_at_str: Option<String> = row.get(5)?;
    let created_at_str: String = row.get(7)?;

    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        category: parse_category(&category_str),
        priority: parse_priority(&priority_str),
        status: parse_status(&status_str),
        triggered_at: triggered_at_str.as_deref().map(parse_datetime_fallback),
        cooldown_minutes: row.get(6)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

const TASK_COLUMNS: &str = "id, text, category, priority, status, triggered_at, cooldown_minutes, created_at";

/// Counts of tasks by status.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub triggered: u64,
}

/// Trigger rate for one priority level.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityTriggerRate {
    pub priority: Priority,
    pub total: u64,
    pub triggered: u64,
}

/// SQLite database for task storage.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `~/.config/geonudge/geonudge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("geonudge.db");
        Self::open_at(&path)
    }

    /// Open the task database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id               TEXT PRIMARY KEY,
                    text             TEXT NOT NULL,
                    category         TEXT NOT NULL DEFAULT 'general',
                    priority         TEXT NOT NULL DEFAULT 'medium',
                    status           TEXT NOT NULL DEFAULT 'pending',
                    triggered_at     TEXT,
                    cooldown_minutes INTEGER NOT NULL DEFAULT 60,
                    created_at       TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
                CREATE INDEX IF NOT EXISTS idx_tasks_category_status ON tasks(category, status);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Insert a new task record.
    pub fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO tasks (id, text, category, priority, status, triggered_at, cooldown_minutes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id,
                task.text,
                task.category.as_str(),
                task.priority.as_str(),
                format_status(task.status),
                task.triggered_at.map(|t| t.to_rfc3339()),
                task.cooldown_minutes,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single task by id.
    pub fn get_task(&self, id: &str) -> Result<Task, StoreError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        task.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    /// All tasks, most recent first.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Pending tasks ordered by priority (`high` < `medium` < `low`),
    /// ties broken by `created_at` descending.
    pub fn list_pending(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE status = 'pending'
             ORDER BY
               CASE priority
                 WHEN 'high' THEN 1
                 WHEN 'medium' THEN 2
                 WHEN 'low' THEN 3
                 ELSE 4
               END ASC,
               created_at DESC"
        ))?;
        let rows = stmt.query_map([], row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Latest trigger timestamp per category among triggered tasks.
    ///
    /// Categories with no triggered task are absent from the map.
    pub fn last_triggered_per_category(
        &self,
    ) -> Result<HashMap<Category, DateTime<Utc>>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category, MAX(triggered_at)
             FROM tasks
             WHERE status = 'triggered' AND triggered_at IS NOT NULL
             GROUP BY category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let (category_str, ts_str) = row?;
            map.insert(parse_category(&category_str), parse_datetime_fallback(&ts_str));
        }
        Ok(map)
    }

    /// Unconditionally mark a task triggered.
    ///
    /// Not idempotent: calling twice overwrites `triggered_at`. Callers
    /// must call at most once per task per pass; the engine uses
    /// [`TaskDb::claim_pending`] instead.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] if the id does not exist.
    pub fn mark_triggered(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = 'triggered', triggered_at = ?2 WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(StoreError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Conditionally transition `pending → triggered`.
    ///
    /// Compare-and-set on the current status: returns `true` if this call
    /// performed the transition, `false` if the task was not pending
    /// (already claimed by a concurrent pass, or absent).
    pub fn claim_pending(&self, id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = 'triggered', triggered_at = ?2
             WHERE id = ?1 AND status = 'pending'",
            params![id, now.to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task by id.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] if the id does not exist.
    pub fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Task counts by status.
    pub fn counts_by_status(&self) -> Result<StatusCounts, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let (status, count) = row?;
            counts.total += count;
            match status.as_str() {
                "triggered" => counts.triggered += count,
                _ => counts.pending += count,
            }
        }
        Ok(counts)
    }

    /// Per-priority trigger rate, ordered `high`, `medium`, `low`.
    pub fn trigger_rate_by_priority(&self) -> Result<Vec<PriorityTriggerRate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT priority,
                    COUNT(*),
                    SUM(CASE WHEN status = 'triggered' THEN 1 ELSE 0 END)
             FROM tasks
             GROUP BY priority
             ORDER BY
               CASE priority
                 WHEN 'high' THEN 1
                 WHEN 'medium' THEN 2
                 WHEN 'low' THEN 3
                 ELSE 4
               END ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        let mut rates = Vec::new();
        for row in rows {
            let (priority_str, total, triggered) = row?;
            rates.push(PriorityTriggerRate {
                priority: parse_priority(&priority_str),
                total,
                triggered,
            });
        }
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_at(
        text: &str,
        category: Category,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Task {
        let mut task = Task::new(text, category, priority, 60);
        task.created_at = created_at;
        task
    }

    #[test]
    fn list_pending_orders_by_priority_then_recency() {
        let db = TaskDb::open_memory().unwrap();
        let base = Utc::now();

        let old_high = task_at("old high", Category::Grocery, Priority::High, base - Duration::hours(2));
        let new_high = task_at("new high", Category::Grocery, Priority::High, base);
        let low = task_at("low", Category::Pharmacy, Priority::Low, base);
        let medium = task_at("medium", Category::Clothing, Priority::Medium, base);

        for task in [&old_high, &new_high, &low, &medium] {
            db.insert_task(task).unwrap();
        }

        let pending = db.list_pending().unwrap();
        let texts: Vec<&str> = pending.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["new high", "old high", "medium", "low"]);
    }

    #[test]
    fn list_pending_excludes_triggered() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("buy milk", Category::Grocery, Priority::Medium, 60);
        db.insert_task(&task).unwrap();
        db.mark_triggered(&task.id, Utc::now()).unwrap();

        assert!(db.list_pending().unwrap().is_empty());
        let stored = db.get_task(&task.id).unwrap();
        assert_eq!(stored.status, TaskStatus::Triggered);
        assert!(stored.triggered_at.is_some());
    }

    #[test]
    fn mark_triggered_unknown_id_is_not_found() {
        let db = TaskDb::open_memory().unwrap();
        let err = db.mark_triggered("task-missing", Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound(_)));
    }

    #[test]
    fn claim_pending_is_a_compare_and_set() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("buy milk", Category::Grocery, Priority::Medium, 60);
        db.insert_task(&task).unwrap();

        let now = Utc::now();
        assert!(db.claim_pending(&task.id, now).unwrap());
        // Second claim observes the task as already triggered.
        assert!(!db.claim_pending(&task.id, now).unwrap());
        // Unknown ids are a failed claim, not an error.
        assert!(!db.claim_pending("task-missing", now).unwrap());
    }

    #[test]
    fn last_triggered_per_category_keeps_latest() {
        let db = TaskDb::open_memory().unwrap();
        let earlier = Utc::now() - Duration::minutes(45);
        let later = Utc::now() - Duration::minutes(5);

        let a = Task::new("milk", Category::Grocery, Priority::Medium, 60);
        let b = Task::new("apples", Category::Grocery, Priority::Medium, 60);
        let c = Task::new("shirt", Category::Clothing, Priority::Medium, 60);
        for task in [&a, &b, &c] {
            db.insert_task(task).unwrap();
        }
        db.mark_triggered(&a.id, earlier).unwrap();
        db.mark_triggered(&b.id, later).unwrap();

        let map = db.last_triggered_per_category().unwrap();
        assert_eq!(map.len(), 1);
        let grocery = map[&Category::Grocery];
        assert!((grocery - later).num_seconds().abs() < 1);
        assert!(!map.contains_key(&Category::Clothing));
    }

    #[test]
    fn delete_task_removes_row() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("buy milk", Category::Grocery, Priority::Medium, 60);
        db.insert_task(&task).unwrap();
        db.delete_task(&task.id).unwrap();
        assert!(matches!(
            db.get_task(&task.id).unwrap_err(),
            StoreError::TaskNotFound(_)
        ));
        assert!(matches!(
            db.delete_task(&task.id).unwrap_err(),
            StoreError::TaskNotFound(_)
        ));
    }

    #[test]
    fn counts_and_trigger_rates() {
        let db = TaskDb::open_memory().unwrap();
        let a = Task::new("milk", Category::Grocery, Priority::High, 60);
        let b = Task::new("apples", Category::Grocery, Priority::High, 60);
        let c = Task::new("shirt", Category::Clothing, Priority::Low, 60);
        for task in [&a, &b, &c] {
            db.insert_task(task).unwrap();
        }
        db.mark_triggered(&a.id, Utc::now()).unwrap();

        let counts = db.counts_by_status().unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.triggered, 1);

        let rates = db.trigger_rate_by_priority().unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].priority, Priority::High);
        assert_eq!(rates[0].total, 2);
        assert_eq!(rates[0].triggered, 1);
        assert_eq!(rates[1].priority, Priority::Low);
        assert_eq!(rates[1].triggered, 0);
    }
}
