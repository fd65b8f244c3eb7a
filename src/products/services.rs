use tracing::info;
use uuid::Uuid;

use super::{
    dto::ProductForm,
    repo::ProductRepo,
    repo_types::{Product, ProductFilter, ProductListing},
};
use crate::db::parse_id;
use crate::error::{AppError, AppResult};

/// Number of products on the home page.
pub const LATEST_LIMIT: i64 = 10;

fn product_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or(AppError::NotFound("product"))
}

pub async fn latest(repo: &dyn ProductRepo) -> AppResult<Vec<ProductListing>> {
    let filter = ProductFilter {
        limit: Some(LATEST_LIMIT),
        ..Default::default()
    };
    Ok(repo.list(&filter).await?)
}

pub async fn get(repo: &dyn ProductRepo, raw_id: &str) -> AppResult<Product> {
    let id = product_id(raw_id)?;
    repo.get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("product"))
}

/// Price and quantity are coerced, never rejected; the supplier id must parse
/// but is not looked up.
pub async fn create(repo: &dyn ProductRepo, form: &ProductForm) -> AppResult<Product> {
    let fields = form.validate()?;
    let product = repo.create(fields).await?;
    info!(product_id = %product.id, supplier_id = %product.supplier_id, "product created");
    Ok(product)
}

/// Succeeds without effect when no product has this id.
pub async fn update(repo: &dyn ProductRepo, raw_id: &str, form: &ProductForm) -> AppResult<()> {
    let id = product_id(raw_id)?;
    let fields = form.validate()?;
    repo.update(id, fields).await?;
    info!(product_id = %id, "product updated");
    Ok(())
}

pub async fn delete(repo: &dyn ProductRepo, raw_id: &str) -> AppResult<()> {
    let id = product_id(raw_id)?;
    repo.delete(id).await?;
    info!(product_id = %id, "product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDb;

    #[tokio::test]
    async fn create_with_garbage_price_stores_zero() {
        let db = MemoryDb::new();
        let form = ProductForm {
            name: "Widget".into(),
            price: "abc".into(),
            quantity: "12".into(),
            supplier: Uuid::new_v4().to_string(),
        };
        let p = create(&db, &form).await.unwrap();
        assert_eq!(p.price, 0.0);
        assert_eq!(p.quantity, 12);
        assert_eq!(get(&db, &p.id.to_string()).await.unwrap().price, 0.0);
    }

    #[tokio::test]
    async fn bad_ids_are_not_found() {
        let db = MemoryDb::new();
        assert!(matches!(
            get(&db, "nope").await,
            Err(AppError::NotFound("product"))
        ));
        assert!(matches!(
            delete(&db, "nope").await,
            Err(AppError::NotFound("product"))
        ));
        assert!(matches!(
            get(&db, &Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound("product"))
        ));
    }
}
