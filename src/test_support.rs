//! Seeding helpers and a fault-injecting store for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::Document;

use crate::models::{Comment, Project, Status, Task, TaskDependency};
use crate::store::memory::MemoryStore;
use crate::store::{self, EntityStore, Filter, StoreError, StoreResult, Table};

pub async fn seed_project(store: &dyn EntityStore, name: &str) -> i64 {
    let project = Project {
        project_id: 0,
        name: Some(name.to_string()),
        description: None,
        start_date: None,
        end_date: None,
        status_id: None,
    };
    store::insert(store, &project).await.unwrap().project_id
}

pub async fn seed_status(store: &dyn EntityStore, name: &str) -> i64 {
    let status = Status {
        status_id: 0,
        name: name.to_string(),
        description: None,
    };
    store::insert(store, &status).await.unwrap().status_id
}

pub async fn seed_task(store: &dyn EntityStore, title: &str, status_id: Option<i64>) -> i64 {
    let task = Task {
        task_id: 0,
        title: title.to_string(),
        description: None,
        due_date: None,
        created_at: Utc::now(),
        project_id: 1,
        status_id,
    };
    store::insert(store, &task).await.unwrap().task_id
}

/// `dependent` waits for `prerequisite`.
pub async fn seed_dependency(store: &dyn EntityStore, prerequisite: i64, dependent: i64) -> i64 {
    let dep = TaskDependency {
        dependency_id: 0,
        task_id: prerequisite,
        dependent_task_id: dependent,
    };
    store::insert(store, &dep).await.unwrap().dependency_id
}

pub async fn seed_comment(store: &dyn EntityStore, task_id: i64, content: &str) -> i64 {
    let comment = Comment {
        comment_id: 0,
        task_id,
        content: content.to_string(),
        created_at: Utc::now(),
    };
    store::insert(store, &comment).await.unwrap().comment_id
}

pub async fn set_task_status(store: &dyn EntityStore, task_id: i64, status_id: Option<i64>) {
    let mut task: Task = store::get(store, task_id).await.unwrap();
    task.status_id = status_id;
    store::update(store, &task).await.unwrap();
}

/// Memory store whose reads can be made to fail for chosen rows or tables.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    broken_rows: Mutex<HashSet<(Table, i64)>>,
    broken_tables: Mutex<HashSet<Table>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn break_row(&self, table: Table, id: i64) {
        self.broken_rows.lock().unwrap().insert((table, id));
    }

    pub fn break_table(&self, table: Table) {
        self.broken_tables.lock().unwrap().insert(table);
    }

    fn outage() -> StoreError {
        StoreError::Backend("simulated outage".to_string())
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn find(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Document>> {
        if self.broken_tables.lock().unwrap().contains(&table) {
            return Err(Self::outage());
        }
        self.inner.find(table, filter).await
    }

    async fn get(&self, table: Table, id: i64) -> StoreResult<Document> {
        if self.broken_rows.lock().unwrap().contains(&(table, id)) {
            return Err(Self::outage());
        }
        self.inner.get(table, id).await
    }

    async fn insert(&self, table: Table, row: Document) -> StoreResult<Document> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: i64, row: Document) -> StoreResult<Document> {
        self.inner.update(table, id, row).await
    }

    async fn delete(&self, table: Table, id: i64) -> StoreResult<()> {
        self.inner.delete(table, id).await
    }

    async fn delete_where(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        self.inner.delete_where(table, filter).await
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
