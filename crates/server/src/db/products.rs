//! Product repository for database operations.
//!
//! Backs the [`ProductStore`] trait with the `products` table, which stores
//! each product as a `JSONB` document under a `BIGSERIAL` key. Insertion
//! order is the tiebreaker for the "first match" operations (`ORDER BY id`).
//!
//! Numeric filters guard with `jsonb_typeof` so documents with a missing or
//! non-numeric field never match and never raise a cast error.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use bramble_core::ProductDoc;

use super::{ProductStore, RepositoryError, UpsertOutcome, bounded};

/// `PostgreSQL`-backed product store.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
    timeout: Duration,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn fetch_docs(&self, query: &str, bind: Option<f64>) -> Result<Vec<ProductDoc>, RepositoryError> {
        let mut q = sqlx::query_scalar::<_, Value>(query);
        if let Some(threshold) = bind {
            q = q.bind(threshold);
        }
        let rows = q.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|value| {
                ProductDoc::try_from(value).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid product document: {e}"))
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn insert(&self, doc: ProductDoc) -> Result<(), RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query("INSERT INTO products (doc) VALUES ($1)")
                .bind(doc.into_value())
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<ProductDoc>, RepositoryError> {
        bounded(
            self.timeout,
            self.fetch_docs("SELECT doc FROM products ORDER BY id", None),
        )
        .await
    }

    async fn find_featured(&self) -> Result<Vec<ProductDoc>, RepositoryError> {
        bounded(
            self.timeout,
            self.fetch_docs(
                "SELECT doc FROM products WHERE doc->'featured' = 'true'::jsonb ORDER BY id",
                None,
            ),
        )
        .await
    }

    async fn find_price_below(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError> {
        bounded(
            self.timeout,
            self.fetch_docs(
                "SELECT doc FROM products \
                 WHERE jsonb_typeof(doc->'price') = 'number' \
                   AND (doc->>'price')::double precision < $1 \
                 ORDER BY id",
                Some(threshold),
            ),
        )
        .await
    }

    async fn find_rating_above(&self, threshold: f64) -> Result<Vec<ProductDoc>, RepositoryError> {
        bounded(
            self.timeout,
            self.fetch_docs(
                "SELECT doc FROM products \
                 WHERE jsonb_typeof(doc->'rating') = 'number' \
                   AND (doc->>'rating')::double precision > $1 \
                 ORDER BY id",
                Some(threshold),
            ),
        )
        .await
    }

    async fn upsert_by_product_id(
        &self,
        product_id: &str,
        doc: ProductDoc,
    ) -> Result<UpsertOutcome, RepositoryError> {
        bounded(self.timeout, async {
            let doc = doc.into_value();

            // Replace the first match; a concurrent miss on both sides can
            // insert twice, which the store contract allows (no uniqueness)
            let result = sqlx::query(
                "UPDATE products SET doc = $2 \
                 WHERE id = (SELECT id FROM products WHERE doc->>'productID' = $1 \
                             ORDER BY id LIMIT 1)",
            )
            .bind(product_id)
            .bind(&doc)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(UpsertOutcome::Replaced);
            }

            sqlx::query("INSERT INTO products (doc) VALUES ($1)")
                .bind(&doc)
                .execute(&self.pool)
                .await?;

            Ok(UpsertOutcome::Inserted)
        })
        .await
    }

    async fn delete_by_product_id(&self, product_id: &str) -> Result<bool, RepositoryError> {
        bounded(self.timeout, async {
            let result = sqlx::query(
                "DELETE FROM products \
                 WHERE id = (SELECT id FROM products WHERE doc->>'productID' = $1 \
                             ORDER BY id LIMIT 1)",
            )
            .bind(product_id)
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use secrecy::SecretString;
    use serde_json::json;

    async fn test_repo() -> ProductRepository {
        let url = std::env::var("BRAMBLE_TEST_DATABASE_URL").expect("test database URL");
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        ProductRepository::new(pool, Duration::from_secs(5))
    }

    fn doc(value: Value) -> ProductDoc {
        ProductDoc::try_from(value).unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (set BRAMBLE_TEST_DATABASE_URL)"]
    async fn test_insert_and_filter() {
        let repo = test_repo().await;
        let id = format!("pg-{}", std::process::id());

        repo.insert(doc(json!({"productID": id, "price": 10, "featured": true})))
            .await
            .unwrap();

        let cheap = repo.find_price_below(20.0).await.unwrap();
        assert!(cheap.iter().any(|d| d.product_id() == Some(id.as_str())));

        let featured = repo.find_featured().await.unwrap();
        assert!(featured.iter().any(|d| d.product_id() == Some(id.as_str())));

        assert!(repo.delete_by_product_id(&id).await.unwrap());
        assert!(!repo.delete_by_product_id(&id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (set BRAMBLE_TEST_DATABASE_URL)"]
    async fn test_upsert_insert_then_replace() {
        let repo = test_repo().await;
        let id = format!("pg-up-{}", std::process::id());

        let outcome = repo
            .upsert_by_product_id(&id, doc(json!({"productID": id, "price": 1})))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = repo
            .upsert_by_product_id(&id, doc(json!({"productID": id, "price": 2})))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Replaced);

        repo.delete_by_product_id(&id).await.unwrap();
    }
}
