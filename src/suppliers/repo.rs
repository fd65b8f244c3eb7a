use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Supplier, SupplierFields};
use crate::db::PgDb;
use crate::memory::MemoryDb;

#[async_trait]
pub trait SupplierRepo: Send + Sync {
    /// All suppliers, name ascending.
    async fn list(&self) -> anyhow::Result<Vec<Supplier>>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Supplier>>;

    async fn create(&self, fields: SupplierFields) -> anyhow::Result<Supplier>;

    /// Overwrite the fields of `id`. An unknown id is a silent no-op.
    async fn update(&self, id: Uuid, fields: SupplierFields) -> anyhow::Result<()>;

    /// Remove `id` if present. Products that reference it are left untouched.
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

#[async_trait]
impl SupplierRepo for PgDb {
    async fn list(&self) -> anyhow::Result<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, address, phone, created_at
            FROM suppliers
            ORDER BY lower(name) COLLATE "C" ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("list suppliers")?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Supplier>> {
        let row = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, address, phone, created_at
            FROM suppliers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("get supplier")?;
        Ok(row)
    }

    async fn create(&self, fields: SupplierFields) -> anyhow::Result<Supplier> {
        let row = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (id, name, address, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .fetch_one(&self.pool)
        .await
        .context("insert supplier")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, fields: SupplierFields) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE suppliers
               SET name = $2, address = $3, phone = $4
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.phone)
        .execute(&self.pool)
        .await
        .context("update supplier")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete supplier")?;
        Ok(())
    }
}

#[async_trait]
impl SupplierRepo for MemoryDb {
    async fn list(&self) -> anyhow::Result<Vec<Supplier>> {
        let tables = self.tables.read().await;
        let mut rows = tables.suppliers.clone();
        // matches the Postgres ordering
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, fields: SupplierFields) -> anyhow::Result<Supplier> {
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: fields.name,
            address: fields.address,
            phone: fields.phone,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update(&self, id: Uuid, fields: SupplierFields) -> anyhow::Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(s) = tables.suppliers.iter_mut().find(|s| s.id == id) {
            s.name = fields.name;
            s.address = fields.address;
            s.phone = fields.phone;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.tables.write().await.suppliers.retain(|s| s.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> SupplierFields {
        SupplierFields {
            name: name.into(),
            address: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let db = MemoryDb::new();
        for name in ["Zeta", "acme", "Midway", "Beta"] {
            db.create(fields(name)).await.unwrap();
        }
        let names: Vec<_> = db.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["acme", "Beta", "Midway", "Zeta"]);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_a_noop() {
        let db = MemoryDb::new();
        let kept = db.create(fields("Acme")).await.unwrap();
        db.update(Uuid::new_v4(), fields("Ghost")).await.unwrap();

        let all = db.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, kept.id);
        assert_eq!(all[0].name, "Acme");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = MemoryDb::new();
        let s = db.create(fields("Acme")).await.unwrap();
        db.update(
            s.id,
            SupplierFields {
                name: "Acme Corp".into(),
                address: Some("1 Main St".into()),
                phone: None,
            },
        )
        .await
        .unwrap();
        let got = db.get_by_id(s.id).await.unwrap().unwrap();
        assert_eq!(got.name, "Acme Corp");
        assert_eq!(got.address.as_deref(), Some("1 Main St"));

        db.delete(s.id).await.unwrap();
        assert!(db.get_by_id(s.id).await.unwrap().is_none());
        // deleting again is not an error
        db.delete(s.id).await.unwrap();
    }
}
