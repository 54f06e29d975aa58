//! Task ↔ redb persistence.
//!
//! Documents are keyed by (owner, id) so every lookup carries the caller
//! identity in the key itself — there is no code path that can read or
//! mutate a task without naming its owner.

use crate::models::{NewTask, Task, TaskPatch};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use std::sync::Arc;
use uuid::Uuid;

const TASKS: TableDefinition<(&str, &[u8]), &[u8]> = TableDefinition::new("tasks");

/// Which task field a list query orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
}

impl SortField {
    /// Unknown fields fall back to creation time, like a raw document
    /// query silently ignoring a bogus sort key.
    pub fn parse(raw: &str) -> SortField {
        match raw {
            "updatedAt" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "status" => SortField::Status,
            _ => SortField::CreatedAt,
        }
    }
}

/// Parameters for owner-scoped list retrieval.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
    pub sort: SortField,
    pub ascending: bool,
    /// Raw status filter. An unknown value matches nothing; the "all"
    /// sentinel is stripped before it gets here.
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            page: 1,
            limit: 10,
            sort: SortField::CreatedAt,
            ascending: false,
            status: None,
        }
    }
}

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct TaskStore {
    db: Arc<Database>,
}

impl TaskStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        // Ensure the table exists
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS)?;
        }
        txn.commit()?;

        Ok(TaskStore { db: Arc::new(db) })
    }

    /// Persist a new task. The store generates the id and both timestamps.
    pub fn create(&self, owner: &str, new: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            status: new.status,
            owner_id: owner.to_string(),
            created_at: now,
            updated_at: now,
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TASKS)?;
            let key: (&str, &[u8]) = (owner, task.id.as_bytes());
            table.insert(key, encode(&task)?.as_slice())?;
        }
        txn.commit()?;
        Ok(task)
    }

    /// Point lookup by (owner, id). A wrong id and a wrong owner are the
    /// same miss — the composite key cannot express one without the other.
    pub fn get(&self, owner: &str, id: Uuid) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TASKS)?;

        let key: (&str, &[u8]) = (owner, id.as_bytes());
        match table.get(key)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Filtered, sorted, paginated retrieval over one owner's tasks.
    /// Returns the page slice plus the post-filter total.
    pub fn list(&self, owner: &str, query: &ListQuery) -> Result<(Vec<Task>, usize), StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TASKS)?;

        // Range over the owner's keyspace only. Ids are 16 bytes, so the
        // all-0xff upper bound is inclusive of every possible id.
        let lo: (&str, &[u8]) = (owner, &[]);
        let hi: (&str, &[u8]) = (owner, &[0xff; 16]);

        let mut tasks = Vec::new();
        for entry in table.range(lo..=hi)? {
            let (_, value) = entry?;
            let task: Task = decode(value.value())?;
            if let Some(status) = &query.status {
                if task.status.as_str() != status {
                    continue;
                }
            }
            tasks.push(task);
        }

        let total = tasks.len();
        sort_tasks(&mut tasks, query.sort, query.ascending);

        let offset = (query.page.max(1) - 1).saturating_mul(query.limit);
        let items = tasks.into_iter().skip(offset).take(query.limit).collect();
        Ok((items, total))
    }

    /// Apply a partial update. Fields absent from the patch keep their
    /// value; `updated_at` is refreshed even for an empty patch.
    pub fn update(&self, owner: &str, id: Uuid, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(TASKS)?;
            let key: (&str, &[u8]) = (owner, id.as_bytes());

            let existing = match table.get(key)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };

            match existing {
                Some(mut task) => {
                    if let Some(title) = patch.title {
                        task.title = title;
                    }
                    if let Some(description) = patch.description {
                        task.description = Some(description);
                    }
                    if let Some(status) = patch.status {
                        task.status = status;
                    }
                    task.updated_at = Utc::now();

                    table.insert(key, encode(&task)?.as_slice())?;
                    Some(task)
                }
                None => None,
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Remove a task. Returns false on a miss (wrong id or wrong owner).
    pub fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut table = txn.open_table(TASKS)?;
            let key: (&str, &[u8]) = (owner, id.as_bytes());
            deleted = table.remove(key)?.is_some();
        }
        txn.commit()?;
        Ok(deleted)
    }
}

fn encode(task: &Task) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(task).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Task, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn sort_tasks(tasks: &mut [Task], field: SortField, ascending: bool) {
    tasks.sort_by(|a, b| {
        let ord = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
            // lexicographic on the wire value (done < progress < todo),
            // matching a raw document sort on the status string
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StoreError {
    Backend(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Backend.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Backend(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Backend(e) => write!(f, "redb: {e}"),
            StoreError::Decode(e) => write!(f, "decode: {e}"),
            StoreError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
