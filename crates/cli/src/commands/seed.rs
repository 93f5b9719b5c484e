//! Seed the database with demo data.
//!
//! Creates one account (Argon2-hashed password, via the same code path the
//! server uses) and a handful of products through the product repository, so
//! a fresh environment has something to log into and list.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tracing::info;

use bramble_core::ProductDoc;
use bramble_server::db::{
    ProductRepository, ProductStore, RepositoryError, UserRepository, create_pool,
};
use bramble_server::services::auth::{AuthError, AuthService};

/// Store call bound for seeding.
const SEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Seed a demo user and demo products.
///
/// Skips anything that already exists, so the command is safe to re-run.
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BRAMBLE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "BRAMBLE_DATABASE_URL is not set")?;

    let pool = create_pool(&SecretString::from(database_url)).await?;
    let users = UserRepository::new(pool.clone(), SEED_TIMEOUT);
    let products = ProductRepository::new(pool, SEED_TIMEOUT);

    let auth = AuthService::new(&users);
    match auth.register(username, password).await {
        Ok(user) => info!(username = %user.username, "Created demo user"),
        Err(AuthError::UserAlreadyExists) => {
            info!(username, "Demo user already exists, skipping");
        }
        Err(e) => return Err(e.into()),
    }

    let demo_products = [
        json!({"productID": "p1", "price": 10, "rating": 4.5, "featured": true, "name": "Enamel mug"}),
        json!({"productID": "p2", "price": 24.5, "rating": 3.8, "featured": false, "name": "Canvas tote"}),
        json!({"productID": "p3", "price": 7.25, "rating": 4.9, "featured": true, "name": "Beeswax candle"}),
    ];

    let mut created = 0usize;
    for value in demo_products {
        let doc = ProductDoc::try_from(value)?;
        let id = doc
            .product_id()
            .ok_or_else(|| {
                RepositoryError::DataCorruption("seed product without productID".to_string())
            })?
            .to_string();

        if products.find_all().await?.iter().any(|d| d.product_id() == Some(id.as_str())) {
            info!(product_id = %id, "Product already exists, skipping");
            continue;
        }

        products.insert(doc).await?;
        created += 1;
    }

    info!(created, "Seed complete");
    Ok(())
}
