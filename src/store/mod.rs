//! Row-level persistence for the task tracker.
//!
//! Every entity lives in its own table keyed by an integer id column
//! (`task_id`, `project_id`, ...). Backends only deal in BSON documents;
//! the typed helpers at the bottom of this module convert to and from the
//! model structs through [`Record`].

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Projects,
    Statuses,
    Tasks,
    Comments,
    TaskDependencies,
}

impl Table {
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Statuses => "statuses",
            Self::Tasks => "tasks",
            Self::Comments => "comments",
            Self::TaskDependencies => "task_dependencies",
        }
    }

    /// Name of the integer primary-key field.
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Projects => "project_id",
            Self::Statuses => "status_id",
            Self::Tasks => "task_id",
            Self::Comments => "comment_id",
            Self::TaskDependencies => "dependency_id",
        }
    }

    /// Singular name used in error messages.
    pub const fn entity_name(self) -> &'static str {
        match self {
            Self::Projects => "Project",
            Self::Statuses => "Status",
            Self::Tasks => "Task",
            Self::Comments => "Comment",
            Self::TaskDependencies => "Dependency",
        }
    }
}

/// Conjunction of field equality predicates. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Bson)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_equals(field: &str, value: impl Into<Bson>) -> Self {
        Self::all().and_equals(field, value)
    }

    pub fn and_equals(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.to_string(), value.into()));
        self
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        for (field, value) in &self.clauses {
            filter.insert(field.clone(), value.clone());
        }
        filter
    }

    pub fn matches(&self, row: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| row.get(field) == Some(value))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to decode record: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(table: Table, id: i64) -> Self {
        Self::NotFound {
            entity: table.entity_name(),
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filtered row accessor over the five tables.
///
/// `find` returns an empty list when nothing matches; `get`, `update` and
/// `delete` fail with [`StoreError::NotFound`] when the id is absent.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Document>>;

    async fn get(&self, table: Table, id: i64) -> StoreResult<Document>;

    /// Allocates the next id, writes it into the row and stores it.
    async fn insert(&self, table: Table, row: Document) -> StoreResult<Document>;

    /// Full-record replacement of the row with the given id.
    async fn update(&self, table: Table, id: i64, row: Document) -> StoreResult<Document>;

    async fn delete(&self, table: Table, id: i64) -> StoreResult<()>;

    async fn delete_where(&self, table: Table, filter: &Filter) -> StoreResult<u64>;

    async fn ping(&self) -> StoreResult<()>;
}

/// A model struct persisted as one row of [`Record::TABLE`].
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: Table;

    fn id(&self) -> i64;
}

fn decode<T: Record>(row: Document) -> StoreResult<T> {
    Ok(bson::from_document(row)?)
}

pub async fn find<T: Record>(store: &dyn EntityStore, filter: &Filter) -> StoreResult<Vec<T>> {
    store
        .find(T::TABLE, filter)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn get<T: Record>(store: &dyn EntityStore, id: i64) -> StoreResult<T> {
    decode(store.get(T::TABLE, id).await?)
}

pub async fn insert<T: Record>(store: &dyn EntityStore, record: &T) -> StoreResult<T> {
    let row = bson::to_document(record)?;
    decode(store.insert(T::TABLE, row).await?)
}

pub async fn update<T: Record>(store: &dyn EntityStore, record: &T) -> StoreResult<T> {
    let row = bson::to_document(record)?;
    decode(store.update(T::TABLE, record.id(), row).await?)
}

pub async fn delete<T: Record>(store: &dyn EntityStore, id: i64) -> StoreResult<()> {
    store.delete(T::TABLE, id).await
}
