//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Product, ProductUpdate, STATUS_AVAILABLE};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All products ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Orderable products only
    pub async fn find_available(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE status = $status ORDER BY name")
            .bind(("status", STATUS_AVAILABLE))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = parse_id(TABLE, id)?;
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Find product by its unique name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        if product.price < Decimal::ZERO {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if self.find_by_name(&product.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "product '{}' already exists",
                product.name
            )));
        }

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Upsert keyed by `name`: create-if-absent, overwrite-if-present.
    pub async fn upsert_by_name(&self, product: Product) -> RepoResult<Product> {
        if product.price < Decimal::ZERO {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        match self.find_by_name(&product.name).await? {
            Some(existing) => {
                let rid = existing
                    .id
                    .ok_or_else(|| RepoError::Database("stored product has no id".into()))?;
                let mut content = product;
                content.id = None;
                let updated: Option<Product> = self
                    .base
                    .db()
                    .query("UPDATE $id CONTENT $data RETURN AFTER")
                    .bind(("id", rid))
                    .bind(("data", content))
                    .await?
                    .take(0)?;
                updated.ok_or_else(|| RepoError::Database("Failed to upsert product".to_string()))
            }
            None => {
                let created: Option<Product> =
                    self.base.db().create(TABLE).content(product).await?;
                created.ok_or_else(|| RepoError::Database("Failed to upsert product".to_string()))
            }
        }
    }

    /// Partial update
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = parse_id(TABLE, id)?;

        if let Some(price) = data.price
            && price < Decimal::ZERO
        {
            return Err(RepoError::Validation("price must not be negative".into()));
        }

        if let Some(ref new_name) = data.name
            && let Some(existing) = self.find_by_name(new_name).await?
            && existing.id.as_ref() != Some(&rid)
        {
            return Err(RepoError::Duplicate(format!(
                "product '{}' already exists",
                new_name
            )));
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.image_url.is_some() {
            set_parts.push("image_url = $image_url");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.status.is_some() {
            set_parts.push("status = $status");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.image_url {
            query = query.bind(("image_url", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.status {
            query = query.bind(("status", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }
}
