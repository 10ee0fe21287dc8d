//! Task tracker records keyed by a generated id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{required, Result, StoreError};
use crate::store::{PersistPolicy, Record, RecordStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(StoreError::InvalidStatus(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl Task {
    fn new(title: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            status: TaskStatus::Pending,
        }
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Description: {}, Status: {}",
            self.id, self.title, self.description, self.status
        )
    }
}

/// Fields to overwrite on update. `None` and empty strings keep the current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Builds a patch from raw prompt answers. Blank answers are skipped; a
    /// non-blank status must parse.
    pub fn from_input(title: &str, description: &str, status: &str) -> Result<Self> {
        let status = match status.trim() {
            "" => None,
            raw => Some(raw.parse()?),
        };
        Ok(Self {
            title: non_blank(title),
            description: non_blank(description),
            status,
        })
    }

    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            task.title = title;
        }
        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Tasks backed by one JSON file.
#[derive(Debug)]
pub struct TaskList {
    store: RecordStore<Task>,
}

impl TaskList {
    pub fn open(path: impl AsRef<Path>, policy: PersistPolicy) -> Result<Self> {
        Ok(Self {
            store: RecordStore::open(path, policy)?,
        })
    }

    /// Creates a pending task. The title is required, the description may be
    /// empty.
    #[instrument(skip(self, description))]
    pub fn add(&mut self, title: &str, description: &str) -> Result<Task> {
        let title = required("title", title)?;
        let task = Task::new(title.to_string(), description.trim().to_string());
        self.store.insert(task.clone())?;
        info!(id = %task.id, "task added");
        Ok(task)
    }

    /// All tasks in insertion order.
    pub fn list(&self) -> &[Task] {
        self.store.records()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.store.get(id)
    }

    #[instrument(skip(self, patch))]
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<bool> {
        let found = self.store.modify(id, |task| patch.apply(task))?;
        if !found {
            debug!("task not found");
        }
        Ok(found)
    }

    pub fn complete(&mut self, id: &str) -> Result<bool> {
        self.update(id, TaskPatch::status(TaskStatus::Completed))
    }

    /// Removes the task. Nothing is written when the id is unknown.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let removed = self.store.remove_where(|t| t.id == id)? > 0;
        if removed {
            info!("task deleted");
        }
        Ok(removed)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    pub fn store(&self) -> &RecordStore<Task> {
        &self.store
    }
}
