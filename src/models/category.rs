use serde::{Deserialize, Serialize};

use crate::models::{PRODUCTS, SUPPLIER_REF};
use crate::store::{to_fields, DynDocumentStore, JsonMap, StoreError};

pub const CATEGORIES: &str = "categories";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "FournisseurId")]
    pub supplier_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Category {
    pub fn new(supplier_id: &str, input: CategoryInput, now: &str) -> Self {
        Self {
            id: String::new(),
            title: input.title.unwrap_or_default(),
            subtitle: input.subtitle.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            image: input.image.unwrap_or_default(),
            supplier_id: supplier_id.to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CategoryModel {
    store: DynDocumentStore,
}

impl CategoryModel {
    pub fn new(store: DynDocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, category: &Category) -> Result<Category, StoreError> {
        let doc = self.store.add(CATEGORIES, to_fields(category)?).await?;
        doc.decode()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Category>, StoreError> {
        self.store
            .get(CATEGORIES, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn get_by_supplier(&self, supplier_id: &str) -> Result<Vec<Category>, StoreError> {
        self.store
            .find_eq(CATEGORIES, SUPPLIER_REF, supplier_id)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    /// Case-sensitive title prefix search within one supplier.
    pub async fn search_by_title(
        &self,
        supplier_id: &str,
        term: &str,
    ) -> Result<Vec<Category>, StoreError> {
        self.store
            .find_prefix(CATEGORIES, SUPPLIER_REF, supplier_id, "title", term)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn update(&self, id: &str, fields: JsonMap) -> Result<bool, StoreError> {
        self.store.update(CATEGORIES, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(CATEGORIES, id).await
    }

    pub async fn delete_by_supplier(&self, supplier_id: &str) -> Result<u64, StoreError> {
        self.store
            .delete_eq(CATEGORIES, SUPPLIER_REF, supplier_id)
            .await
    }

    pub async fn products_count(&self, category_id: &str) -> Result<u64, StoreError> {
        self.store
            .count_eq(PRODUCTS, "categoryId", category_id)
            .await
    }
}
