use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),
}

/// A record that can live in a [`DocumentStore`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Equality conditions plus optional ordering and limit.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub equals: Vec<(String, Bson)>,
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn to_query(&self) -> BsonDocument {
        let mut query = BsonDocument::new();
        for (field, value) in &self.equals {
            query.insert(field.clone(), value.clone());
        }
        query
    }

    fn matches(&self, document: &BsonDocument) -> bool {
        self.equals
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

#[async_trait]
pub trait DocumentStore<T: Record>: Send + Sync {
    /// Inserts a new document and returns its generated id.
    async fn insert(&self, record: T) -> Result<ObjectId, StoreError>;
    async fn get(&self, id: &ObjectId) -> Result<Option<T>, StoreError>;
    async fn find(&self, filter: Filter) -> Result<Vec<T>, StoreError>;
    /// Replaces the document with `id`; returns false when it does not exist.
    async fn replace(&self, id: &ObjectId, record: T) -> Result<bool, StoreError>;
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct MongoStore<T: Send + Sync> {
    client: Arc<Client>,
    collection: Collection<T>,
}

impl<T: Record> MongoStore<T> {
    pub fn new(client: Arc<Client>, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection::<T>(collection);
        Self { client, collection }
    }
}

#[async_trait]
impl<T: Record> DocumentStore<T> for MongoStore<T> {
    async fn insert(&self, mut record: T) -> Result<ObjectId, StoreError> {
        let id = record.id().unwrap_or_else(ObjectId::new);
        record.set_id(id);
        self.collection.insert_one(&record).await?;
        Ok(id)
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn find(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        let mut action = self.collection.find(filter.to_query());
        if let Some((field, order)) = &filter.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            let mut sort = BsonDocument::new();
            sort.insert(field.clone(), direction);
            action = action.sort(sort);
        }
        if let Some(limit) = filter.limit {
            action = action.limit(limit);
        }
        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn replace(&self, id: &ObjectId, mut record: T) -> Result<bool, StoreError> {
        record.set_id(*id);
        let result = self
            .collection
            .replace_one(doc! { "_id": *id }, &record)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(self.collection.namespace().db.as_str())
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

/// Process-local store used in development (no `MONGODB_URI`) and in tests.
pub struct MemoryStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<T>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.id().is_none() {
                    record.set_id(ObjectId::new());
                }
                record
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl<T: Record> DocumentStore<T> for MemoryStore<T> {
    async fn insert(&self, mut record: T) -> Result<ObjectId, StoreError> {
        let id = record.id().unwrap_or_else(ObjectId::new);
        record.set_id(id);
        self.records.write().push(record);
        Ok(id)
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.id().as_ref() == Some(id))
            .cloned())
    }

    async fn find(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        let snapshot = self.records.read().clone();
        let mut matched = Vec::new();
        for record in snapshot {
            let document = bson::to_document(&record)?;
            if filter.matches(&document) {
                matched.push((document, record));
            }
        }

        if let Some((field, order)) = &filter.sort {
            matched.sort_by(|(a, _), (b, _)| {
                let ordering = compare_bson(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let limit = filter
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|(_, record)| record)
            .collect())
    }

    async fn replace(&self, id: &ObjectId, mut record: T) -> Result<bool, StoreError> {
        record.set_id(*id);
        let mut records = self.records.write();
        match records.iter_mut().find(|r| r.id().as_ref() == Some(id)) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.id().as_ref() != Some(id));
        Ok(records.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// Missing values sort first, mirroring MongoDB's ordering of null.
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a, b) {
                (Bson::String(x), Bson::String(y)) => x.cmp(y),
                (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
                (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
                (Bson::Null, Bson::Null) => Ordering::Equal,
                (Bson::Null, _) => Ordering::Less,
                (_, Bson::Null) => Ordering::Greater,
                _ => Ordering::Equal,
            },
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        owner: String,
        rank: i32,
    }

    impl Record for Note {
        fn id(&self) -> Option<ObjectId> {
            self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = Some(id);
        }
    }

    fn note(owner: &str, rank: i32) -> Note {
        Note {
            id: None,
            owner: owner.to_string(),
            rank,
        }
    }

    #[actix_rt::test]
    async fn insert_assigns_id_and_get_returns_it() {
        let store = MemoryStore::new();
        let id = store.insert(note("a", 1)).await.unwrap();
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.owner, "a");
    }

    #[actix_rt::test]
    async fn find_filters_sorts_and_limits() {
        let store = MemoryStore::with_records(vec![
            note("a", 3),
            note("b", 9),
            note("a", 1),
            note("a", 2),
        ]);

        let found = store
            .find(
                Filter::all()
                    .eq("owner", "a")
                    .sort("rank", SortOrder::Descending)
                    .limit(2),
            )
            .await
            .unwrap();
        let ranks: Vec<i32> = found.iter().map(|n| n.rank).collect();
        assert_eq!(ranks, vec![3, 2]);
    }

    #[actix_rt::test]
    async fn replace_and_delete_report_missing_documents() {
        let store = MemoryStore::new();
        let id = store.insert(note("a", 1)).await.unwrap();

        assert!(store.replace(&id, note("a", 5)).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap().unwrap().rank, 5);

        let unknown = ObjectId::new();
        assert!(!store.replace(&unknown, note("x", 0)).await.unwrap());
        assert!(!store.delete(&unknown).await.unwrap());

        assert!(store.delete(&id).await.unwrap());
        assert!(store.is_empty());
    }
}
