use serde::{Deserialize, Serialize};

use crate::store::{to_fields, Document, DynDocumentStore, JsonMap, StoreError};

/// The tenant record. Each owner is expected to hold exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub matricule_fiscale: String,
    pub address: String,
    pub opening_hours: String,
    pub owner_id: String,
    pub image: String,
    pub use_user_address: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable supplier fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricule_fiscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_user_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Supplier {
    pub fn new(owner_id: &str, input: SupplierInput, now: &str) -> Self {
        Self {
            id: String::new(),
            name: input.name.unwrap_or_default(),
            matricule_fiscale: input.matricule_fiscale.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            opening_hours: input.opening_hours.unwrap_or_default(),
            owner_id: owner_id.to_string(),
            image: input.image.unwrap_or_default(),
            use_user_address: input.use_user_address.unwrap_or(false),
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SupplierModel {
    store: DynDocumentStore,
    collection: String,
}

impl SupplierModel {
    pub fn new(store: DynDocumentStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn create(&self, supplier: &Supplier) -> Result<Supplier, StoreError> {
        let doc = self
            .store
            .add(&self.collection, to_fields(supplier)?)
            .await?;
        doc.decode()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Supplier>, StoreError> {
        self.store
            .get(&self.collection, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Raw documents owned by `owner_id`, oldest first.
    pub async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, StoreError> {
        self.store
            .find_eq(&self.collection, "ownerId", owner_id)
            .await
    }

    /// The owner's supplier. Extra records left by concurrent creates are
    /// ignored; the oldest wins.
    pub async fn first_by_owner(&self, owner_id: &str) -> Result<Option<Supplier>, StoreError> {
        self.get_by_owner(owner_id)
            .await?
            .first()
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn update(&self, id: &str, fields: JsonMap) -> Result<bool, StoreError> {
        self.store.update(&self.collection, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(&self.collection, id).await
    }
}
