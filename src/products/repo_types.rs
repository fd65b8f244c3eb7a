use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Validated, writable product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    Name,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub supplier_id: Option<Uuid>,
    /// Case-insensitive literal substring of the product name.
    pub name_contains: Option<String>,
    pub sort: ProductSort,
    pub limit: Option<i64>,
}

/// Supplier fields resolved for display next to a product.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// A product with its supplier resolved; `supplier` is `None` when the
/// referenced supplier no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    pub product: Product,
    pub supplier: Option<SupplierRef>,
}

#[derive(Debug, FromRow)]
pub struct ProductListingRow {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier_id: Uuid,
    pub created_at: OffsetDateTime,
    pub supplier_name: Option<String>,
    pub supplier_address: Option<String>,
    pub supplier_phone: Option<String>,
}

impl From<ProductListingRow> for ProductListing {
    fn from(r: ProductListingRow) -> Self {
        let supplier = r.supplier_name.map(|name| SupplierRef {
            id: r.supplier_id,
            name,
            address: r.supplier_address,
            phone: r.supplier_phone,
        });
        Self {
            product: Product {
                id: r.id,
                name: r.name,
                price: r.price,
                quantity: r.quantity,
                supplier_id: r.supplier_id,
                created_at: r.created_at,
            },
            supplier,
        }
    }
}
