use tracing::info;
use uuid::Uuid;

use super::{dto::SupplierForm, repo::SupplierRepo, repo_types::Supplier};
use crate::db::parse_id;
use crate::error::{AppError, AppResult};

pub(crate) fn supplier_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or(AppError::NotFound("supplier"))
}

pub async fn get(repo: &dyn SupplierRepo, raw_id: &str) -> AppResult<Supplier> {
    let id = supplier_id(raw_id)?;
    repo.get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("supplier"))
}

pub async fn create(repo: &dyn SupplierRepo, form: &SupplierForm) -> AppResult<Supplier> {
    let fields = form.validate()?;
    let supplier = repo.create(fields).await?;
    info!(supplier_id = %supplier.id, "supplier created");
    Ok(supplier)
}

/// Succeeds without effect when no supplier has this id.
pub async fn update(repo: &dyn SupplierRepo, raw_id: &str, form: &SupplierForm) -> AppResult<()> {
    let id = supplier_id(raw_id)?;
    let fields = form.validate()?;
    repo.update(id, fields).await?;
    info!(supplier_id = %id, "supplier updated");
    Ok(())
}

/// Products referencing the supplier keep their now dangling reference.
pub async fn delete(repo: &dyn SupplierRepo, raw_id: &str) -> AppResult<()> {
    let id = supplier_id(raw_id)?;
    repo.delete(id).await?;
    info!(supplier_id = %id, "supplier deleted");
    Ok(())
}
