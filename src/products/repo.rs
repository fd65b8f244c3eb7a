use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{
    Product, ProductFields, ProductFilter, ProductListing, ProductListingRow, ProductSort,
    SupplierRef,
};
use crate::db::PgDb;
use crate::memory::MemoryDb;

#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Products matching `filter`, each with its supplier resolved.
    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<ProductListing>>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>>;

    /// The referenced supplier is not checked for existence.
    async fn create(&self, fields: ProductFields) -> anyhow::Result<Product>;

    /// Overwrite the fields of `id`. An unknown id is a silent no-op.
    async fn update(&self, id: Uuid, fields: ProductFields) -> anyhow::Result<()>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Escape LIKE metacharacters so the search text matches literally.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait]
impl ProductRepo for PgDb {
    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<ProductListing>> {
        let order = match filter.sort {
            ProductSort::Newest => "p.created_at DESC",
            ProductSort::Name => r#"lower(p.name) COLLATE "C" ASC, p.created_at DESC"#,
        };
        let sql = format!(
            r#"
            SELECT p.id, p.name, p.price, p.quantity, p.supplier_id, p.created_at,
                   s.name AS supplier_name,
                   s.address AS supplier_address,
                   s.phone AS supplier_phone
              FROM products p
              LEFT JOIN suppliers s ON s.id = p.supplier_id
             WHERE ($1::uuid IS NULL OR p.supplier_id = $1)
               AND ($2::text IS NULL OR p.name ILIKE $2)
             ORDER BY {order}
             LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, ProductListingRow>(&sql)
            .bind(filter.supplier_id)
            .bind(filter.name_contains.as_deref().map(like_pattern))
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
            .context("list products")?;
        Ok(rows.into_iter().map(ProductListing::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, quantity, supplier_id, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get product")?;
        Ok(row)
    }

    async fn create(&self, fields: ProductFields) -> anyhow::Result<Product> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, price, quantity, supplier_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, price, quantity, supplier_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(fields.supplier_id)
        .fetch_one(&self.pool)
        .await
        .context("insert product")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, fields: ProductFields) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE products
               SET name = $2, price = $3, quantity = $4, supplier_id = $5
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(fields.supplier_id)
        .execute(&self.pool)
        .await
        .context("update product")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete product")?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepo for MemoryDb {
    async fn list(&self, filter: &ProductFilter) -> anyhow::Result<Vec<ProductListing>> {
        let tables = self.tables.read().await;
        let needle = filter.name_contains.as_ref().map(|q| q.to_lowercase());

        // newest insert first so equal timestamps still come out newest first
        let mut rows: Vec<ProductListing> = tables
            .products
            .iter()
            .rev()
            .filter(|p| filter.supplier_id.map_or(true, |id| p.supplier_id == id))
            .filter(|p| {
                needle
                    .as_ref()
                    .map_or(true, |n| p.name.to_lowercase().contains(n.as_str()))
            })
            .map(|p| ProductListing {
                product: p.clone(),
                supplier: tables
                    .suppliers
                    .iter()
                    .find(|s| s.id == p.supplier_id)
                    .map(|s| SupplierRef {
                        id: s.id,
                        name: s.name.clone(),
                        address: s.address.clone(),
                        phone: s.phone.clone(),
                    }),
            })
            .collect();

        match filter.sort {
            ProductSort::Newest => {
                rows.sort_by(|a, b| b.product.created_at.cmp(&a.product.created_at))
            }
            // same order as the Postgres query: lowercased byte order, newest on ties
            ProductSort::Name => rows.sort_by(|a, b| {
                a.product
                    .name
                    .to_lowercase()
                    .cmp(&b.product.name.to_lowercase())
                    .then(b.product.created_at.cmp(&a.product.created_at))
            }),
        }
        if let Some(limit) = filter.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, fields: ProductFields) -> anyhow::Result<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: fields.name,
            price: fields.price,
            quantity: fields.quantity,
            supplier_id: fields.supplier_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, fields: ProductFields) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(p) = tables.products.iter_mut().find(|p| p.id == id) {
            p.name = fields.name;
            p.price = fields.price;
            p.quantity = fields.quantity;
            p.supplier_id = fields.supplier_id;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.tables.write().await.products.retain(|p| p.id != id);
        Ok(())
    }
}
