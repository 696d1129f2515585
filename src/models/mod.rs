//! Typed access to the dashboard collections.
//!
//! Each model is a thin wrapper over the document store. Nothing here keeps
//! the collections consistent with each other: a category may name a
//! supplier that no longer exists, and cascades are plain sequences of
//! independent deletes.

pub mod category;
pub mod product;
pub mod supplier;
pub mod user;

use serde::Serialize;

use crate::config::CatalogConfig;
use crate::store::{DynDocumentStore, StoreError};

pub use category::{Category, CategoryInput, CategoryModel, CATEGORIES};
pub use product::{Product, ProductInput, ProductModel};
pub use supplier::{Supplier, SupplierInput, SupplierModel};
pub use user::{User, UserInput, UserModel, UserStatus, USERS};

pub const PRODUCTS: &str = "products";

/// Field naming the owning supplier on categories and products.
pub const SUPPLIER_REF: &str = "FournisseurId";

/// Timestamp format written into `createdAt` / `updatedAt`.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub products: u64,
    pub categories: u64,
}

#[derive(Clone)]
pub struct Catalog {
    pub suppliers: SupplierModel,
    pub categories: CategoryModel,
    pub products: ProductModel,
    pub users: UserModel,
}

impl Catalog {
    pub fn new(store: DynDocumentStore, config: &CatalogConfig) -> Self {
        Self {
            suppliers: SupplierModel::new(store.clone(), config.supplier_collection.clone()),
            categories: CategoryModel::new(store.clone()),
            products: ProductModel::new(store.clone()),
            users: UserModel::new(store),
        }
    }

    /// Remove a supplier with its products and categories, in that order.
    ///
    /// Each step is committed on its own. If a later step fails, the earlier
    /// deletions stay applied.
    pub async fn delete_supplier_cascade(
        &self,
        supplier_id: &str,
    ) -> Result<CascadeReport, StoreError> {
        let products = self.products.delete_by_supplier(supplier_id).await?;
        let categories = self.categories.delete_by_supplier(supplier_id).await?;
        self.suppliers.delete(supplier_id).await?;

        tracing::info!(
            supplier_id,
            products,
            categories,
            "Supplier deleted with dependents"
        );
        Ok(CascadeReport {
            products,
            categories,
        })
    }
}
