use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::{EntityStore, Filter, StoreError, StoreResult, Table};

#[derive(Default)]
struct Rows {
    last_id: i64,
    records: BTreeMap<i64, Document>,
}

/// Process-local store. Rows are kept in id order; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.records
                    .values()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, table: Table, id: i64) -> StoreResult<Document> {
        let tables = self.tables.read().await;
        tables
            .get(&table)
            .and_then(|rows| rows.records.get(&id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(table, id))
    }

    async fn insert(&self, table: Table, mut row: Document) -> StoreResult<Document> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        rows.last_id += 1;
        let id = rows.last_id;
        row.insert(table.id_field(), Bson::Int64(id));
        rows.records.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: i64, mut row: Document) -> StoreResult<Document> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .get_mut(&table)
            .and_then(|rows| rows.records.get_mut(&id))
            .ok_or_else(|| StoreError::not_found(table, id))?;
        row.insert(table.id_field(), Bson::Int64(id));
        *slot = row.clone();
        Ok(row)
    }

    async fn delete(&self, table: Table, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .get_mut(&table)
            .and_then(|rows| rows.records.remove(&id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(table, id))
    }

    async fn delete_where(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.records.len();
        rows.records.retain(|_, row| !filter.matches(row));
        Ok((before - rows.records.len()) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
