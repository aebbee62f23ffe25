use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Businesses,
    Calls,
    Transcripts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Businesses => "businesses",
            Collection::Calls => "calls",
            Collection::Transcripts => "transcripts",
        }
    }
}

/// Schemaless document storage, grouped into collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document and return its generated id.
    async fn add(&self, collection: Collection, body: Value) -> Result<Uuid, StoreError>;

    /// Documents whose top-level `field` equals `value`, oldest first, at most `limit`.
    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        limit: i64,
    ) -> Result<Vec<Value>, StoreError>;

    /// Merge `patch` into every document whose `field` equals `value`; returns how many matched.
    async fn update_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        patch: Value,
    ) -> Result<u64, StoreError>;
}

fn field_matches(body: &Value, field: &str, value: &str) -> bool {
    match body.get(field) {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.to_string() == value,
        Some(Value::Bool(b)) => b.to_string() == value,
        _ => false,
    }
}

/// Documents kept in process memory, used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    pub async fn all(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: Collection, body: Value) -> Result<Uuid, StoreError> {
        if !body.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let id = Uuid::new_v4();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(body);
        Ok(id)
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        limit: i64,
    ) -> Result<Vec<Value>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| field_matches(d, field, value))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        patch: Value,
    ) -> Result<u64, StoreError> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => return Err(StoreError::NotAnObject),
        };
        let mut collections = self.collections.write().await;
        let mut matched = 0;
        for doc in collections.entry(collection).or_default().iter_mut() {
            if !field_matches(doc, field, value) {
                continue;
            }
            if let Value::Object(body) = doc {
                body.extend(patch.clone());
                matched += 1;
            }
        }
        Ok(matched)
    }
}

/// Documents stored as JSONB rows in Postgres.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("connected to document database");
        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn add(&self, collection: Collection, body: Value) -> Result<Uuid, StoreError> {
        if !body.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection.as_str())
            .bind(Json(body))
            .execute(&self.pool)
            .await?;
        debug!(%id, collection = collection.as_str(), "added document");
        Ok(id)
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        limit: i64,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT body FROM documents \
             WHERE collection = $1 AND body ->> $2 = $3 \
             ORDER BY seq \
             LIMIT $4",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<Value, StoreError> {
                let Json(body): Json<Value> = row.try_get("body")?;
                Ok(body)
            })
            .collect()
    }

    async fn update_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        patch: Value,
    ) -> Result<u64, StoreError> {
        if !patch.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let result = sqlx::query(
            "UPDATE documents SET body = body || $4 \
             WHERE collection = $1 AND body ->> $2 = $3",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .bind(Json(patch))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Postgres-backed store when `DATABASE_URL` is set; those tests are skipped otherwise.
    async fn pg_store() -> Option<PgStore> {
        let _ = dotenvy::dotenv();
        let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty())?;
        Some(PgStore::connect(&url).await.unwrap())
    }

    #[tokio::test]
    async fn add_never_deduplicates() {
        let store = MemoryStore::new();
        let doc = json!({"event": "call-started"});
        let first = store.add(Collection::Calls, doc.clone()).await.unwrap();
        let second = store.add(Collection::Calls, doc).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.count(Collection::Calls).await, 2);
        assert_eq!(store.count(Collection::Transcripts).await, 0);
    }

    #[tokio::test]
    async fn find_eq_filters_and_limits_in_insertion_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .add(Collection::Calls, json!({"business_id": "b-1", "n": i}))
                .await
                .unwrap();
        }
        store
            .add(Collection::Calls, json!({"business_id": "b-2", "n": 99}))
            .await
            .unwrap();

        let found = store
            .find_eq(Collection::Calls, "business_id", "b-1", 3)
            .await
            .unwrap();
        let ns: Vec<i64> = found.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn update_eq_patches_every_match() {
        let store = MemoryStore::new();
        store
            .add(Collection::Businesses, json!({"email": "a@b.test", "plan": "starter"}))
            .await
            .unwrap();
        store
            .add(Collection::Businesses, json!({"email": "a@b.test", "plan": "pro"}))
            .await
            .unwrap();
        store
            .add(Collection::Businesses, json!({"email": "other@b.test"}))
            .await
            .unwrap();

        let matched = store
            .update_eq(
                Collection::Businesses,
                "email",
                "a@b.test",
                json!({"subscription_id": "sub_1"}),
            )
            .await
            .unwrap();
        assert_eq!(matched, 2);

        let docs = store.all(Collection::Businesses).await;
        assert_eq!(docs[0]["subscription_id"], "sub_1");
        assert_eq!(docs[0]["plan"], "starter");
        assert_eq!(docs[1]["subscription_id"], "sub_1");
        assert!(docs[2].get("subscription_id").is_none());
    }

    #[tokio::test]
    async fn rejects_non_object_documents() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add(Collection::Calls, json!([1, 2])).await,
            Err(StoreError::NotAnObject)
        ));
    }

    #[tokio::test]
    async fn pg_find_eq_filters_and_limits_in_insertion_order() {
        let Some(store) = pg_store().await else {
            return;
        };
        // Unique key so runs against a shared database don't see each other's rows.
        let business = Uuid::new_v4().to_string();
        for i in 0..5 {
            store
                .add(Collection::Calls, json!({"business_id": business, "n": i}))
                .await
                .unwrap();
        }
        store
            .add(
                Collection::Calls,
                json!({"business_id": format!("{business}-other"), "n": 99}),
            )
            .await
            .unwrap();
        store
            .add(Collection::Transcripts, json!({"business_id": business, "n": 98}))
            .await
            .unwrap();

        let found = store
            .find_eq(Collection::Calls, "business_id", &business, 3)
            .await
            .unwrap();
        let ns: Vec<i64> = found.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2]);

        let all = store
            .find_eq(Collection::Calls, "business_id", &business, 100)
            .await
            .unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn pg_update_eq_patches_every_match() {
        let Some(store) = pg_store().await else {
            return;
        };
        let email = format!("{}@acme.test", Uuid::new_v4());
        let other = format!("other-{email}");
        store
            .add(Collection::Businesses, json!({"email": email, "plan": "starter"}))
            .await
            .unwrap();
        store
            .add(Collection::Businesses, json!({"email": email, "plan": "pro"}))
            .await
            .unwrap();
        store
            .add(Collection::Businesses, json!({"email": other}))
            .await
            .unwrap();

        let matched = store
            .update_eq(
                Collection::Businesses,
                "email",
                &email,
                json!({"subscription_id": "sub_1"}),
            )
            .await
            .unwrap();
        assert_eq!(matched, 2);

        let docs = store
            .find_eq(Collection::Businesses, "email", &email, 10)
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["subscription_id"], "sub_1");
        assert_eq!(docs[0]["plan"], "starter");
        assert_eq!(docs[1]["subscription_id"], "sub_1");
        assert_eq!(docs[1]["plan"], "pro");

        let untouched = store
            .find_eq(Collection::Businesses, "email", &other, 10)
            .await
            .unwrap();
        assert!(untouched[0].get("subscription_id").is_none());
    }
}
