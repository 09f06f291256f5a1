//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Paged listing of active products, newest first
//! - One-shot filtering (category, price bounds, stock)
//! - Name search for the search-as-you-type widgets
//! - CRUD for the admin layer (insert, update, soft delete)
//!
//! ## Visibility Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_active = 1  ──►  listed, filterable, searchable, detail page        │
//! │  is_active = 0  ──►  invisible to every storefront query                │
//! │                      (still reachable through get_by_id for admin)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use keyshop_core::validation::{validate_price, validate_product_name, validate_stock};
use keyshop_core::{FilterCriteria, Money, ProductSummary};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.price_cents,
        p.stock,
        p.category_id,
        c.name AS category_name,
        p.is_active,
        p.created_at,
        p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

// =============================================================================
// Records
// =============================================================================

/// A product row joined with its category name.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Builds the wire summary. `images` are already-public URLs.
    pub fn into_summary(self, images: Vec<String>) -> ProductSummary {
        ProductSummary {
            id: self.id.into(),
            price: self.price(),
            name: self.name,
            description: self.description,
            stock: self.stock,
            category: self.category_name,
            images,
        }
    }
}

/// Fields an admin supplies when creating or editing a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category_id: Option<i64>,
}

impl NewProduct {
    pub fn validate(&self) -> DbResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.list_active_page(2, 12).await?;
/// let total = repo.count_active().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// One page of active products, newest (highest id) first.
    ///
    /// `page` is 1-based; 0 is treated as 1. A `limit` of 0 returns nothing.
    pub async fn list_active_page(&self, page: u32, limit: u32) -> DbResult<Vec<ProductRecord>> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);

        debug!(page, limit, offset, "Listing active products");

        let sql = format!(
            "{SELECT_PRODUCT} WHERE p.is_active = 1 ORDER BY p.id DESC LIMIT ?1 OFFSET ?2"
        );
        let products = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every active product matching all set criteria, newest first.
    ///
    /// Price bounds are inclusive. `in_stock` keeps rows with `stock > 0`.
    /// The result is complete; there is no paging.
    pub async fn filter(&self, criteria: &FilterCriteria) -> DbResult<Vec<ProductRecord>> {
        debug!(?criteria, "Filtering products");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_PRODUCT);
        qb.push(" WHERE p.is_active = 1");

        if let Some(category) = criteria.category {
            qb.push(" AND p.category_id = ").push_bind(category);
        }
        if let Some(min) = criteria.min_price {
            qb.push(" AND p.price_cents >= ").push_bind(min.cents());
        }
        if let Some(max) = criteria.max_price {
            qb.push(" AND p.price_cents <= ").push_bind(max.cents());
        }
        if criteria.in_stock {
            qb.push(" AND p.stock > 0");
        }
        qb.push(" ORDER BY p.id DESC");

        let products = qb
            .build_query_as::<ProductRecord>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Filter returned products");
        Ok(products)
    }

    /// Active products whose name contains `query`, case-insensitively.
    ///
    /// `%` and `_` in the query match literally.
    pub async fn search_by_name(&self, query: &str, limit: u32) -> DbResult<Vec<ProductRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query = %query, limit, "Searching products by name");

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r"{SELECT_PRODUCT}
            WHERE p.is_active = 1 AND p.name LIKE ?1 ESCAPE '\'
            ORDER BY p.name COLLATE NOCASE, p.id DESC
            LIMIT ?2"
        );
        let products = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(pattern)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Active product by id, for the storefront detail route.
    pub async fn get_active_by_id(&self, id: i64) -> DbResult<Option<ProductRecord>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = ?1 AND p.is_active = 1");
        let product = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Product by id regardless of `is_active`.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ProductRecord>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = ?1");
        let product = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Inserts an active product and returns the stored row.
    ///
    /// ## Errors
    /// - `DbError::Validation` - empty name, negative price or stock
    /// - `DbError::ForeignKeyViolation` - unknown `category_id`
    pub async fn insert(&self, product: &NewProduct) -> DbResult<ProductRecord> {
        product.validate()?;
        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, price_cents, stock, category_id,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.category_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Replaces the editable fields of a product.
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<()> {
        product.validate()?;
        debug!(id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                category_id = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.category_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Hides a product from every storefront query.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// All rows, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Escapes LIKE wildcards with `\`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_product(name: &str, cents: i64, stock: i64, category_id: Option<i64>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: Some(format!("{name} description")),
            price: Money::from_cents(cents),
            stock,
            category_id,
        }
    }

    async fn seeded() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let keycaps = db.categories().insert("Keycaps").await.unwrap();
        let repo = db.products();
        repo.insert(&new_product("GMK Olivia", 12900, 3, Some(keycaps.id)))
            .await
            .unwrap();
        repo.insert(&new_product("PBT Blanks", 3500, 0, Some(keycaps.id)))
            .await
            .unwrap();
        repo.insert(&new_product("Coiled Cable", 4500, 10, None))
            .await
            .unwrap();
        (db, keycaps.id)
    }

    #[tokio::test]
    async fn test_list_active_page_newest_first() {
        let (db, _) = seeded().await;
        let repo = db.products();

        let first = repo.list_active_page(1, 2).await.unwrap();
        let names: Vec<_> = first.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Coiled Cable", "PBT Blanks"]);

        let second = repo.list_active_page(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "GMK Olivia");
        assert_eq!(second[0].category_name.as_deref(), Some("Keycaps"));

        assert!(repo.list_active_page(3, 2).await.unwrap().is_empty());
        assert_eq!(repo.count_active().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_soft_deleted_products_are_hidden() {
        let (db, _) = seeded().await;
        let repo = db.products();
        let cable = repo.search_by_name("cable", 10).await.unwrap().remove(0);

        repo.soft_delete(cable.id).await.unwrap();

        assert_eq!(repo.count_active().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
        assert!(repo.get_active_by_id(cable.id).await.unwrap().is_none());
        assert!(repo.get_by_id(cable.id).await.unwrap().is_some());
        assert!(repo.search_by_name("cable", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_combines_criteria() {
        let (db, keycaps) = seeded().await;
        let repo = db.products();

        let by_category = repo
            .filter(&FilterCriteria {
                category: Some(keycaps),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 2);

        let in_stock_keycaps = repo
            .filter(&FilterCriteria {
                category: Some(keycaps),
                in_stock: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_stock_keycaps.len(), 1);
        assert_eq!(in_stock_keycaps[0].name, "GMK Olivia");

        let price_band = repo
            .filter(&FilterCriteria {
                min_price: Some(Money::from_cents(3500)),
                max_price: Some(Money::from_cents(4500)),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = price_band.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Coiled Cable", "PBT Blanks"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let (db, _) = seeded().await;
        let repo = db.products();
        repo.insert(&new_product("100% Cotton Deskmat", 2500, 1, None))
            .await
            .unwrap();

        assert_eq!(repo.search_by_name("gmk", 10).await.unwrap().len(), 1);
        let literal = repo.search_by_name("100%", 10).await.unwrap();
        assert_eq!(literal.len(), 1);
        assert!(repo.search_by_name("_", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_validates_and_update_round_trips() {
        let (db, _) = seeded().await;
        let repo = db.products();

        let err = repo.insert(&new_product("  ", 100, 1, None)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .insert(&new_product("Ghost", 100, 1, Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let created = repo.insert(&new_product("Switch Puller", 500, 5, None)).await.unwrap();
        repo.update(created.id, &new_product("Switch Puller Pro", 750, 5, None))
            .await
            .unwrap();
        let updated = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Switch Puller Pro");
        assert_eq!(updated.price(), Money::from_cents(750));

        assert!(matches!(
            repo.update(9999, &new_product("Nope", 1, 1, None)).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }

    #[test]
    fn test_into_summary() {
        let now = Utc::now();
        let record = ProductRecord {
            id: 7,
            name: "Keycap Set".into(),
            description: None,
            price_cents: 2499,
            stock: 4,
            category_id: Some(1),
            category_name: Some("Keycaps".into()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let summary = record.into_summary(vec!["/uploads/k.jpg".into()]);
        assert_eq!(summary.id.as_str(), "7");
        assert_eq!(summary.price.cents(), 2499);
        assert_eq!(summary.category.as_deref(), Some("Keycaps"));
    }
}
