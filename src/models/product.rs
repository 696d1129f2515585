use serde::{Deserialize, Serialize};

use crate::catalog::{
    self, is_available, normalize_tags, price_with_tax, price_without_tax, round3, CatalogError,
    StockLevel, DEFAULT_TVA,
};
use crate::models::{PRODUCTS, SUPPLIER_REF};
use crate::store::{to_fields, DynDocumentStore, JsonMap, StoreError};

fn default_tva() -> f64 {
    DEFAULT_TVA
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category_id: String,
    #[serde(rename = "FournisseurId")]
    pub supplier_id: String,
    pub stock_quantity: i64,
    #[serde(rename = "prixHTVA")]
    pub prix_htva: f64,
    #[serde(default = "default_tva")]
    pub tva: f64,
    #[serde(rename = "prixTTC")]
    pub prix_ttc: f64,
    pub is_available: bool,
    pub tags: Vec<String>,
    /// Maintained outside the dashboard; never written from product input.
    pub reviews: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Product form payload. When both prices are sent the pre-tax price wins
/// and the tax-inclusive one is recomputed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub stock_quantity: Option<i64>,
    #[serde(rename = "prixHTVA")]
    pub prix_htva: Option<f64>,
    pub tva: Option<f64>,
    #[serde(rename = "prixTTC")]
    pub prix_ttc: Option<f64>,
    pub tags: Option<Vec<String>>,
}

impl Product {
    /// Build a new product for `supplier_id`. Title and category are required.
    pub fn new(supplier_id: &str, input: ProductInput, now: &str) -> Result<Self, CatalogError> {
        if input.title.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(CatalogError::MissingField("title"));
        }
        if input.category_id.as_deref().unwrap_or("").is_empty() {
            return Err(CatalogError::MissingField("categoryId"));
        }

        let mut product = Product {
            supplier_id: supplier_id.to_string(),
            tva: DEFAULT_TVA,
            created_at: now.to_string(),
            ..Default::default()
        };
        product.apply(input, now)?;
        Ok(product)
    }

    /// Apply a form payload, recomputing the derived price and availability.
    pub fn apply(&mut self, input: ProductInput, now: &str) -> Result<(), CatalogError> {
        if let Some(title) = input.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(CatalogError::MissingField("title"));
            }
            self.title = title.to_string();
        }
        if let Some(category_id) = input.category_id {
            if category_id.is_empty() {
                return Err(CatalogError::MissingField("categoryId"));
            }
            self.category_id = category_id;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if let Some(image) = input.image {
            self.image = image;
        }
        if let Some(stock) = input.stock_quantity {
            self.stock_quantity = catalog::validate_stock(stock)?;
        }
        if let Some(tags) = input.tags {
            self.tags = normalize_tags(tags)?;
        }

        if let Some(tva) = input.tva {
            self.tva = catalog::validate_tva(tva)?;
        }
        match (input.prix_htva, input.prix_ttc) {
            (Some(htva), _) => self.prix_htva = round3(catalog::validate_price(htva)?),
            (None, Some(ttc)) => {
                self.prix_htva = price_without_tax(catalog::validate_price(ttc)?, self.tva)
            }
            (None, None) => {}
        }
        let prix_ttc = price_with_tax(self.prix_htva, self.tva);
        if !self.prix_htva.is_finite() || !prix_ttc.is_finite() {
            return Err(CatalogError::InvalidPrice);
        }
        self.prix_ttc = prix_ttc;
        self.is_available = is_available(self.stock_quantity);
        self.updated_at = now.to_string();

        Ok(())
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::of(self.stock_quantity)
    }
}

#[derive(Clone)]
pub struct ProductModel {
    store: DynDocumentStore,
}

impl ProductModel {
    pub fn new(store: DynDocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, product: &Product) -> Result<Product, StoreError> {
        let doc = self.store.add(PRODUCTS, to_fields(product)?).await?;
        doc.decode()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.store
            .get(PRODUCTS, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn get_by_supplier(&self, supplier_id: &str) -> Result<Vec<Product>, StoreError> {
        self.store
            .find_eq(PRODUCTS, SUPPLIER_REF, supplier_id)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn get_by_category(&self, category_id: &str) -> Result<Vec<Product>, StoreError> {
        self.store
            .find_eq(PRODUCTS, "categoryId", category_id)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn update(&self, id: &str, fields: JsonMap) -> Result<bool, StoreError> {
        self.store.update(PRODUCTS, id, fields).await
    }

    /// Persist every field of `product` over the stored document.
    pub async fn save(&self, product: &Product) -> Result<bool, StoreError> {
        self.update(&product.id, to_fields(product)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(PRODUCTS, id).await
    }

    pub async fn delete_by_supplier(&self, supplier_id: &str) -> Result<u64, StoreError> {
        self.store.delete_eq(PRODUCTS, SUPPLIER_REF, supplier_id).await
    }

    pub async fn delete_by_category(&self, category_id: &str) -> Result<u64, StoreError> {
        self.store.delete_eq(PRODUCTS, "categoryId", category_id).await
    }
}
