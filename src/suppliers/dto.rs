use serde::Deserialize;

use super::repo_types::SupplierFields;
use crate::error::{AppError, AppResult};

/// Form body for supplier create and edit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SupplierForm {
    pub name: String,
    pub address: String,
    pub phone: String,
}

fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

impl SupplierForm {
    pub fn validate(&self) -> AppResult<SupplierFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Supplier name is required."));
        }
        Ok(SupplierFields {
            name: name.to_string(),
            address: optional(&self.address),
            phone: optional(&self.phone),
        })
    }
}
