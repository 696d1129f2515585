// SQLite implementation - documents live as JSON text in a single table
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::state::DbPool;
use crate::store::{merge_fields, Document, DocumentStore, JsonMap, StoreError};

/// Upper bound appended to a prefix for range matching.
const PREFIX_SENTINEL: char = '\u{f8ff}';

pub struct SqliteDocumentStore {
    pool: DbPool,
}

impl SqliteDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field)
}

fn new_document_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

fn parse_row(id: String, data: String) -> Result<Document, StoreError> {
    let data: JsonMap = serde_json::from_str(&data)?;
    Ok(Document::new(id, data))
}

fn collect_documents(rows: Vec<(String, String)>) -> Result<Vec<Document>, StoreError> {
    rows.into_iter()
        .map(|(id, data)| parse_row(id, data))
        .collect()
}

fn delete_row(pool: &DbPool, collection: &str, id: &str) -> Result<bool, StoreError> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
    )?;
    Ok(rows > 0)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn add(&self, collection: &str, data: JsonMap) -> Result<Document, StoreError> {
        let conn = self.pool.get()?;
        let id = new_document_id();

        conn.execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)",
            params![collection, id, serde_json::to_string(&data)?],
        )?;

        Ok(Document::new(id, data))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: JsonMap,
    ) -> Result<Document, StoreError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO documents (collection, id, data)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, id) DO UPDATE SET
               data = excluded.data,
               updated_at = datetime('now')",
            params![collection, id, serde_json::to_string(&data)?],
        )?;

        Ok(Document::new(id, data))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.pool.get()?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|data| parse_row(id.to_string(), data))
            .transpose()
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt =
            conn.prepare("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq")?;
        let rows = stmt
            .query_map(params![collection], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        collect_documents(rows)
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, data FROM documents
             WHERE collection = ?1 AND json_extract(data, ?2) = ?3
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![collection, json_path(field), value], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        collect_documents(rows)
    }

    async fn find_prefix(
        &self,
        collection: &str,
        eq_field: &str,
        eq_value: &str,
        prefix_field: &str,
        prefix: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let conn = self.pool.get()?;
        let upper = format!("{}{}", prefix, PREFIX_SENTINEL);

        let mut stmt = conn.prepare(
            "SELECT id, data FROM documents
             WHERE collection = ?1
               AND json_extract(data, ?2) = ?3
               AND json_extract(data, ?4) >= ?5
               AND json_extract(data, ?4) <= ?6
             ORDER BY json_extract(data, ?4), seq",
        )?;
        let rows = stmt
            .query_map(
                params![
                    collection,
                    json_path(eq_field),
                    eq_value,
                    json_path(prefix_field),
                    prefix,
                    upper
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        collect_documents(rows)
    }

    async fn count_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<u64, StoreError> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents
             WHERE collection = ?1 AND json_extract(data, ?2) = ?3",
            params![collection, json_path(field), value],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonMap,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(current) = current else {
            return Ok(false);
        };

        let mut data: JsonMap = serde_json::from_str(&current)?;
        merge_fields(&mut data, patch);

        tx.execute(
            "UPDATE documents SET data = ?3, updated_at = datetime('now')
             WHERE collection = ?1 AND id = ?2",
            params![collection, id, serde_json::to_string(&data)?],
        )?;
        tx.commit()?;

        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        delete_row(&self.pool, collection, id)
    }

    async fn delete_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<u64, StoreError> {
        let matches = self.find_eq(collection, field, value).await?;

        let tasks = matches.into_iter().map(|doc| {
            let pool = self.pool.clone();
            let collection = collection.to_string();
            tokio::task::spawn_blocking(move || delete_row(&pool, &collection, &doc.id))
        });
        let results = futures::future::join_all(tasks).await;

        let mut deleted = 0u64;
        let mut first_error = None;
        for result in results {
            let outcome = result.map_err(|e| StoreError::Task(e.to_string()));
            match outcome.and_then(|inner| inner) {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(collection, field, value, "Bulk delete failure: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteDocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = db::create_pool(&temp_dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        (SqliteDocumentStore::new(pool), temp_dir)
    }

    fn fields(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let (store, _temp) = create_test_store();

        let doc = store
            .add("categories", fields(json!({"title": "Boissons"})))
            .await
            .unwrap();
        assert!(uuid::Uuid::parse_str(&doc.id).is_ok());

        let loaded = store.get("categories", &doc.id).await.unwrap();
        assert_eq!(loaded, Some(doc.clone()));

        // collections are separate namespaces
        assert_eq!(store.get("products", &doc.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() {
        let (store, _temp) = create_test_store();

        store
            .set("users", "acct-1", fields(json!({"email": "a@b.tn", "phone": "1"})))
            .await
            .unwrap();
        store
            .set("users", "acct-1", fields(json!({"email": "a@b.tn"})))
            .await
            .unwrap();

        let doc = store.get("users", "acct-1").await.unwrap().unwrap();
        assert!(doc.field("phone").is_none());
        assert_eq!(store.list("users").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_eq_scopes_by_field() {
        let (store, _temp) = create_test_store();

        for (title, owner) in [("A", "s1"), ("B", "s2"), ("C", "s1")] {
            store
                .add(
                    "categories",
                    fields(json!({"title": title, "FournisseurId": owner})),
                )
                .await
                .unwrap();
        }

        let found = store
            .find_eq("categories", "FournisseurId", "s1")
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().filter_map(|d| d.str_field("title")).collect();
        assert_eq!(titles, vec!["A", "C"]);

        assert_eq!(
            store.count_eq("categories", "FournisseurId", "s1").await.unwrap(),
            2
        );
        assert!(store
            .find_eq("categories", "FournisseurId", "nobody")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_prefix_bounds() {
        let (store, _temp) = create_test_store();

        for title in ["Pizzas", "Pâtes", "Pizza Box", "Salades", "pizza"] {
            store
                .add(
                    "categories",
                    fields(json!({"title": title, "FournisseurId": "s1"})),
                )
                .await
                .unwrap();
        }
        store
            .add(
                "categories",
                fields(json!({"title": "Pizzeria", "FournisseurId": "s2"})),
            )
            .await
            .unwrap();

        let found = store
            .find_prefix("categories", "FournisseurId", "s1", "title", "Pizz")
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().filter_map(|d| d.str_field("title")).collect();
        // case-sensitive, ordered by title, other supplier excluded
        assert_eq!(titles, vec!["Pizza Box", "Pizzas"]);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (store, _temp) = create_test_store();

        let doc = store
            .add(
                "products",
                fields(json!({"title": "Jus", "stockQuantity": 4, "tags": ["frais"]})),
            )
            .await
            .unwrap();

        let updated = store
            .update("products", &doc.id, fields(json!({"stockQuantity": 0})))
            .await
            .unwrap();
        assert!(updated);

        let loaded = store.get("products", &doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.field("stockQuantity"), Some(&json!(0)));
        assert_eq!(loaded.str_field("title"), Some("Jus"));
        assert_eq!(loaded.field("tags"), Some(&json!(["frais"])));
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let (store, _temp) = create_test_store();
        let updated = store
            .update("products", "ghost", fields(json!({"title": "x"})))
            .await
            .unwrap();
        assert!(!updated);
        assert!(store.list("products").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _temp) = create_test_store();

        let doc = store
            .add("products", fields(json!({"title": "Jus"})))
            .await
            .unwrap();

        assert!(store.delete("products", &doc.id).await.unwrap());
        assert_eq!(store.get("products", &doc.id).await.unwrap(), None);
        // deleting again is a no-op
        assert!(!store.delete("products", &doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_eq_removes_only_matches() {
        let (store, _temp) = create_test_store();

        for i in 0..12 {
            let owner = if i % 3 == 0 { "s2" } else { "s1" };
            store
                .add(
                    "products",
                    fields(json!({"title": format!("P{i}"), "FournisseurId": owner})),
                )
                .await
                .unwrap();
        }

        let deleted = store
            .delete_eq("products", "FournisseurId", "s1")
            .await
            .unwrap();
        assert_eq!(deleted, 8);

        let remaining = store.list("products").await.unwrap();
        assert_eq!(remaining.len(), 4);
        assert!(remaining
            .iter()
            .all(|d| d.str_field("FournisseurId") == Some("s2")));

        // nothing left to match
        assert_eq!(
            store
                .delete_eq("products", "FournisseurId", "s1")
                .await
                .unwrap(),
            0
        );
    }
}
