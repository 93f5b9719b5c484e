//! In-memory store backends.
//!
//! Used by the integration tests and anywhere a database-free assembly of the
//! app is useful. Semantics mirror the `PostgreSQL` repositories: insertion
//! order decides "first match", and `productID` is not unique.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use bramble_core::{ProductDoc, Username};

use super::{ProductStore, RepositoryError, UpsertOutcome, UserStore};
use crate::models::User;

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Username, (User, String)>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(username).map(|(user, _)| user.clone()))
    }

    async fn find_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let user = User {
            username: username.clone(),
            created_at: Utc::now(),
        };
        users.insert(username.clone(), (user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

/// In-memory product store over an insertion-ordered vector.
#[derive(Default)]
pub struct MemoryProductStore {
    docs: RwLock<Vec<ProductDoc>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, doc: ProductDoc) -> Result<(), RepositoryError> {
        self.docs.write().await.push(doc);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<ProductDoc>, RepositoryError> {
        Ok(self.docs.read().await.clone())
    }

    async fn find_featured(&self) -> Result<Vec<ProductDoc>, RepositoryError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| d.featured()).cloned().collect())
    }

    async fn find_price_below(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|d| d.price().is_some_and(|p| p < threshold))
            .cloned()
            .collect())
    }

    async fn find_rating_above(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|d| d.rating().is_some_and(|r| r > threshold))
            .cloned()
            .collect())
    }

    async fn upsert_by_product_id(
        &self,
        product_id: &str,
        doc: ProductDoc,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.product_id() == Some(product_id)) {
            Some(slot) => {
                *slot = doc;
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                docs.push(doc);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn delete_by_product_id(&self, product_id: &str) -> Result<bool, RepositoryError> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| d.product_id() == Some(product_id)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ProductDoc {
        ProductDoc::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_user_store_create_and_find() {
        let store = MemoryUserStore::new();
        let alice = Username::parse("alice").unwrap();

        assert!(store.find_by_username(&alice).await.unwrap().is_none());

        store.create(&alice, "hash1").await.unwrap();
        let user = store.find_by_username(&alice).await.unwrap().unwrap();
        assert_eq!(user.username, alice);

        let (_, hash) = store.find_with_password_hash(&alice).await.unwrap().unwrap();
        assert_eq!(hash, "hash1");
    }

    #[tokio::test]
    async fn test_user_store_duplicate_is_conflict() {
        let store = MemoryUserStore::new();
        let alice = Username::parse("alice").unwrap();

        store.create(&alice, "hash1").await.unwrap();
        assert!(matches!(
            store.create(&alice, "hash2").await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_preserves_insertion_order() {
        let store = MemoryProductStore::new();
        store.insert(doc(json!({"productID": "a"}))).await.unwrap();
        store.insert(doc(json!({"productID": "b"}))).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].product_id(), Some("a"));
        assert_eq!(all[1].product_id(), Some("b"));
    }

    #[tokio::test]
    async fn test_filters_skip_malformed_fields() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "a", "price": 10, "rating": 4})))
            .await
            .unwrap();
        store
            .insert(doc(json!({"productID": "b", "price": "ten", "rating": "high"})))
            .await
            .unwrap();
        store.insert(doc(json!({"productID": "c"}))).await.unwrap();

        let cheap = store.find_price_below(100.0).await.unwrap();
        assert_eq!(cheap.len(), 1);
        assert_eq!(cheap[0].product_id(), Some("a"));

        let rated = store.find_rating_above(1.0).await.unwrap();
        assert_eq!(rated.len(), 1);
    }

    #[tokio::test]
    async fn test_price_filter_is_strict() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "a", "price": 10})))
            .await
            .unwrap();

        assert!(store.find_price_below(10.0).await.unwrap().is_empty());
        assert_eq!(store.find_price_below(10.01).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_featured_filter() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "a", "featured": true})))
            .await
            .unwrap();
        store
            .insert(doc(json!({"productID": "b", "featured": false})))
            .await
            .unwrap();
        store
            .insert(doc(json!({"productID": "c", "featured": "yes"})))
            .await
            .unwrap();

        let featured = store.find_featured().await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].product_id(), Some("a"));
    }

    #[tokio::test]
    async fn test_upsert_replaces_first_match_only() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "p1", "price": 1})))
            .await
            .unwrap();
        store
            .insert(doc(json!({"productID": "p1", "price": 2})))
            .await
            .unwrap();

        let outcome = store
            .upsert_by_product_id("p1", doc(json!({"productID": "p1", "price": 9})))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Replaced);

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].price(), Some(9.0));
        // The second duplicate is untouched
        assert_eq!(all[1].price(), Some(2.0));
    }

    #[tokio::test]
    async fn test_upsert_replace_drops_old_fields() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "p1", "color": "green"})))
            .await
            .unwrap();

        store
            .upsert_by_product_id("p1", doc(json!({"productID": "p1", "price": 5})))
            .await
            .unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        // Replace, not merge
        assert_eq!(all[0].get("color"), None);
        assert_eq!(all[0].price(), Some(5.0));
    }

    #[tokio::test]
    async fn test_upsert_inserts_on_miss() {
        let store = MemoryProductStore::new();
        let outcome = store
            .upsert_by_product_id("p1", doc(json!({"productID": "p1"})))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_first_match_only() {
        let store = MemoryProductStore::new();
        store
            .insert(doc(json!({"productID": "p1", "price": 1})))
            .await
            .unwrap();
        store
            .insert(doc(json!({"productID": "p1", "price": 2})))
            .await
            .unwrap();

        assert!(store.delete_by_product_id("p1").await.unwrap());
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].price(), Some(2.0));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryProductStore::new();
        store.insert(doc(json!({"productID": "p1"}))).await.unwrap();

        assert!(!store.delete_by_product_id("ghost").await.unwrap());
        assert_eq!(store.len().await, 1);
    }
}
