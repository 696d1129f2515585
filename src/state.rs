use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::geocode::Geocoder;
use crate::models::Catalog;
use crate::store::{DynDocumentStore, SqliteDocumentStore};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub catalog: Catalog,
    pub geocoder: Arc<Geocoder>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> anyhow::Result<Self> {
        let store: DynDocumentStore = Arc::new(SqliteDocumentStore::new(db.clone()));
        let catalog = Catalog::new(store, &config.catalog);
        let geocoder = Geocoder::new(&config.geocoder)?;

        Ok(Self {
            db,
            config,
            catalog,
            geocoder: Arc::new(geocoder),
        })
    }
}
