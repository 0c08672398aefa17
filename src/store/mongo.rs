use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info};
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};

use super::{EntityStore, Filter, StoreError, StoreResult, Table};

/// Holds the sequence number for each table, keyed by collection name.
const COUNTERS: &str = "counters";

pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn init(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        info!("Connected MongoDB store to database {}", db_name);
        Ok(MongoStore { client, db })
    }

    fn coll(&self, table: Table) -> Collection<Document> {
        self.db.collection::<Document>(table.collection())
    }

    fn id_filter(table: Table, id: i64) -> Document {
        let mut filter = Document::new();
        filter.insert(table.id_field(), Bson::Int64(id));
        filter
    }

    async fn next_id(&self, table: Table) -> StoreResult<i64> {
        let counters = self.db.collection::<Document>(COUNTERS);
        let counter = counters
            .find_one_and_update(
                doc! { "_id": table.collection() },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        counter
            .and_then(|c| c.get_i64("seq").ok())
            .ok_or_else(|| {
                StoreError::Backend(format!("could not allocate an id for {}", table.collection()))
            })
    }
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn find(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Document>> {
        let mut sort = Document::new();
        sort.insert(table.id_field(), 1);

        let mut cursor = self.coll(table).find(filter.to_document()).sort(sort).await?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next().await {
            rows.push(row?);
        }
        debug!("Fetched {} rows from {}", rows.len(), table.collection());
        Ok(rows)
    }

    async fn get(&self, table: Table, id: i64) -> StoreResult<Document> {
        self.coll(table)
            .find_one(Self::id_filter(table, id))
            .await?
            .ok_or_else(|| StoreError::not_found(table, id))
    }

    async fn insert(&self, table: Table, mut row: Document) -> StoreResult<Document> {
        let id = self.next_id(table).await?;
        row.insert(table.id_field(), Bson::Int64(id));
        self.coll(table).insert_one(&row).await?;
        Ok(row)
    }

    async fn update(&self, table: Table, id: i64, mut row: Document) -> StoreResult<Document> {
        row.insert(table.id_field(), Bson::Int64(id));
        let res = self
            .coll(table)
            .update_one(Self::id_filter(table, id), doc! { "$set": row.clone() })
            .await?;
        if res.matched_count == 0 {
            return Err(StoreError::not_found(table, id));
        }
        Ok(row)
    }

    async fn delete(&self, table: Table, id: i64) -> StoreResult<()> {
        let res = self.coll(table).delete_one(Self::id_filter(table, id)).await?;
        if res.deleted_count == 0 {
            return Err(StoreError::not_found(table, id));
        }
        Ok(())
    }

    async fn delete_where(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        let res = self.coll(table).delete_many(filter.to_document()).await?;
        Ok(res.deleted_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
