use serde::Deserialize;

use super::repo_types::{ProductFields, ProductFilter, ProductSort};
use crate::db::parse_id;
use crate::error::{AppError, AppResult};

/// Form body for product create and edit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub supplier: String,
}

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub supplier: String,
    pub q: String,
    pub sort: String,
}

/// Lenient price parse: anything that is not a finite number becomes 0.
pub fn coerce_price(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Lenient quantity parse: decimals are truncated, anything else becomes 0.
pub fn coerce_quantity(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return v;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

impl ProductForm {
    pub fn validate(&self) -> AppResult<ProductFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Product name is required."));
        }
        if self.supplier.trim().is_empty() {
            return Err(AppError::validation("Please choose a supplier."));
        }
        let supplier_id = parse_id(&self.supplier)
            .ok_or_else(|| AppError::validation("Invalid supplier reference."))?;
        Ok(ProductFields {
            name: name.to_string(),
            price: coerce_price(&self.price),
            quantity: coerce_quantity(&self.quantity),
            supplier_id,
        })
    }
}

impl ProductQuery {
    pub fn to_filter(&self) -> AppResult<ProductFilter> {
        let supplier_id = match self.supplier.trim() {
            "" => None,
            raw => Some(
                parse_id(raw).ok_or_else(|| AppError::validation("Invalid supplier filter."))?,
            ),
        };
        let q = self.q.trim();
        Ok(ProductFilter {
            supplier_id,
            name_contains: (!q.is_empty()).then(|| q.to_string()),
            sort: match self.sort.as_str() {
                "name" => ProductSort::Name,
                _ => ProductSort::Newest,
            },
            limit: None,
        })
    }
}
