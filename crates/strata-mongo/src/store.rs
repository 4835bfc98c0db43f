//! Typed-collection document adapter.

use std::time::Duration;

use mongodb::bson::Document;
use mongodb::options::ReplaceOptions;
use mongodb::sync::{Client, Collection};
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_core::{ConnectionSettings, Result, StoreError, SyncStore};
use tracing::{debug, info};

/// Default identity field for documents.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// CRUD adapter over one typed MongoDB collection.
///
/// The client owns its own connection pool; this adapter only owns the
/// collection handle and the identity field name.
pub struct MongoStore<T> {
    collection: Collection<T>,
    id_field: String,
}

impl<T> MongoStore<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    /// Connect to `mongodb://<host>:<port>`, binding the descriptor's
    /// database and collection, with `_id` as the identity field.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        Self::connect_with_id_field(settings, DEFAULT_ID_FIELD)
    }

    /// Connect with an explicit identity field name — for document shapes
    /// whose key lives outside `_id`.
    pub fn connect_with_id_field(
        settings: &ConnectionSettings,
        id_field: impl Into<String>,
    ) -> Result<Self> {
        let url = settings.mongo_url();
        let client = Client::with_uri_str(&url).map_err(StoreError::connection)?;
        let collection = client
            .database(&settings.database)
            .collection::<T>(&settings.table);
        info!(%url, database = %settings.database, collection = %settings.table, "document store connected");
        Ok(Self {
            collection,
            id_field: id_field.into(),
        })
    }

    /// Bind to a collection on a client the caller already owns.
    ///
    /// The client's lifecycle (creation, shutdown) stays with the caller;
    /// several stores may share one client.
    pub fn with_client(
        client: &Client,
        database: &str,
        collection: &str,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            collection: client.database(database).collection::<T>(collection),
            id_field: id_field.into(),
        }
    }

    fn filter(&self, key: &str) -> Document {
        key_filter(&self.id_field, key)
    }
}

fn key_filter(id_field: &str, key: &str) -> Document {
    let mut filter = Document::new();
    let _ = filter.insert(id_field.to_owned(), key);
    filter
}

impl<T> SyncStore<T> for MongoStore<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    fn fetch(&self, key: &str) -> Result<Option<T>> {
        self.collection
            .find_one(self.filter(key), None)
            .map_err(StoreError::query)
    }

    fn fetch_all(&self) -> Result<Vec<T>> {
        let cursor = self.collection.find(None, None).map_err(StoreError::query)?;
        cursor
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::query)
    }

    fn save(&self, key: &str, value: &T) -> Result<bool> {
        let options = ReplaceOptions::builder().upsert(true).build();
        let _ = self
            .collection
            .replace_one(self.filter(key), value, options)
            .map_err(StoreError::query)?;
        Ok(true)
    }

    fn save_with_ttl(&self, key: &str, value: &T, ttl: Duration) -> Result<bool> {
        debug!(?ttl, "ttl has no effect on the document store");
        self.save(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let outcome = self
            .collection
            .delete_one(self.filter(key), None)
            .map_err(StoreError::query)?;
        Ok(outcome.deleted_count > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Account {
        #[serde(rename = "_id")]
        id: String,
        balance: i64,
    }

    fn account(id: &str, balance: i64) -> Account {
        Account {
            id: id.to_owned(),
            balance,
        }
    }

    fn settings() -> ConnectionSettings {
        ConnectionSettings::new("localhost", 27017, "strata_test", "root", "root", "accounts")
    }

    #[test]
    fn filter_targets_the_identity_field() {
        let filter = key_filter("_id", "a1");
        assert_eq!(filter.get_str("_id").unwrap(), "a1");
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn filter_honors_custom_identity_field() {
        let filter = key_filter("account_id", "a1");
        assert_eq!(filter.get_str("account_id").unwrap(), "a1");
    }

    #[test]
    #[ignore = "requires a running MongoDB at localhost:27017"]
    fn round_trip() {
        let store: MongoStore<Account> = MongoStore::connect(&settings()).unwrap();
        let value = account("a1", 100);
        assert!(store.save("a1", &value).unwrap());
        assert_eq!(store.fetch("a1").unwrap(), Some(value));
        assert!(store.delete("a1").unwrap());
        assert_eq!(store.fetch("a1").unwrap(), None);
    }

    #[test]
    #[ignore = "requires a running MongoDB at localhost:27017"]
    fn fetch_all_returns_saved_documents() {
        let store: MongoStore<Account> = MongoStore::connect(&settings()).unwrap();
        store.save("a1", &account("a1", 1)).unwrap();
        store.save("a2", &account("a2", 2)).unwrap();

        let mut all = store.fetch_all().unwrap();
        all.sort_by(|left, right| left.id.cmp(&right.id));
        assert_eq!(all, vec![account("a1", 1), account("a2", 2)]);

        store.delete("a1").unwrap();
        store.delete("a2").unwrap();
    }

    #[test]
    #[ignore = "requires a running MongoDB at localhost:27017"]
    fn delete_absent_document_returns_false() {
        let store: MongoStore<Account> = MongoStore::connect(&settings()).unwrap();
        assert!(!store.delete("never-written").unwrap());
    }
}
