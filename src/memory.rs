use tokio::sync::RwLock;

use crate::auth::repo_types::User;
use crate::products::repo_types::Product;
use crate::suppliers::repo_types::Supplier;

/// Rows kept in insertion order.
#[derive(Default)]
pub(crate) struct Tables {
    pub users: Vec<User>,
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
}

/// In-process backend selected with `DATABASE_URL=memory://`; also backs the
/// tests. Implements every repository trait.
#[derive(Default)]
pub struct MemoryDb {
    pub(crate) tables: RwLock<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}
