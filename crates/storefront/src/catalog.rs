//! Catalog service: product CRUD in front of a `moka` read cache.
//!
//! Reads go through a 5-minute TTL cache; writes go straight to the
//! database and invalidate the affected entries.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use mercadito_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{Product, ProductInput};

const LIST_KEY: &str = "products:all";

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// Cached view over the product catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    pool: PgPool,
    cache: Cache<String, CacheValue>,
}

impl Catalog {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner { pool, cache }),
        }
    }

    fn repo(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    /// List the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(LIST_KEY).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(self.repo().list().await?);

        self.inner
            .cache
            .insert(
                LIST_KEY.to_string(),
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let cache_key = product_key(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product = self.repo().get(id).await?;

        if let Some(product) = &product {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Create a product and invalidate the cached list.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = self.repo().create(input).await?;
        self.inner.cache.invalidate(LIST_KEY).await;
        Ok(product)
    }

    /// Update a product and invalidate its cached entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = self.repo().update(id, input).await?;
        self.inner.cache.invalidate(&product_key(id)).await;
        self.inner.cache.invalidate(LIST_KEY).await;
        Ok(product)
    }

    /// Delete a product and invalidate its cached entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let deleted = self.repo().delete(id).await?;
        if !deleted {
            return Err(RepositoryError::NotFound);
        }
        self.inner.cache.invalidate(&product_key(id)).await;
        self.inner.cache.invalidate(LIST_KEY).await;
        Ok(())
    }
}

fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}
