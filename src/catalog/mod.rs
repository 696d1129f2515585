//! Catalog rules shared by the product and dashboard endpoints: tax-inclusive
//! pricing, stock availability, tag hygiene and listing filters.

pub mod filter;
pub mod summary;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use filter::{ProductFilter, StatusFilter};
pub use summary::{CategoryShare, SupplierSummary};

/// Tunisian standard VAT rate, used when a product is saved without one.
pub const DEFAULT_TVA: f64 = 19.0;

pub const MAX_TAGS: usize = 10;

/// Stock at or below this is reported as low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Upper bound for any single price, in dinars. Keeps millime rounding and
/// the tax-inclusive price finite.
pub const MAX_PRICE: f64 = 1_000_000_000.0;

/// Upper bound for a product's stock quantity.
pub const MAX_STOCK: i64 = 1_000_000_000;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Maximum 10 tags allowed")]
    TooManyTags,

    #[error("Price must be a number between 0 and 1000000000")]
    InvalidPrice,

    #[error("TVA must be between 0 and 100")]
    InvalidTaxRate,

    #[error("Stock quantity cannot be negative")]
    NegativeStock,

    #[error("Stock quantity cannot exceed 1000000000")]
    StockTooLarge,

    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Prices are kept to the millime.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Prix TTC = Prix HTVA × (1 + TVA/100)
pub fn price_with_tax(prix_htva: f64, tva: f64) -> f64 {
    round3(prix_htva * (1.0 + tva / 100.0))
}

pub fn price_without_tax(prix_ttc: f64, tva: f64) -> f64 {
    if tva == 0.0 {
        round3(prix_ttc)
    } else {
        round3(prix_ttc / (1.0 + tva / 100.0))
    }
}

pub fn validate_price(value: f64) -> Result<f64, CatalogError> {
    if value.is_finite() && (0.0..=MAX_PRICE).contains(&value) {
        Ok(value)
    } else {
        Err(CatalogError::InvalidPrice)
    }
}

pub fn validate_tva(value: f64) -> Result<f64, CatalogError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(CatalogError::InvalidTaxRate)
    }
}

pub fn validate_stock(value: i64) -> Result<i64, CatalogError> {
    if value < 0 {
        Err(CatalogError::NegativeStock)
    } else if value > MAX_STOCK {
        Err(CatalogError::StockTooLarge)
    } else {
        Ok(value)
    }
}

pub fn is_available(stock_quantity: i64) -> bool {
    stock_quantity > 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Healthy,
    Low,
    Out,
}

impl StockLevel {
    pub fn of(stock_quantity: i64) -> Self {
        if stock_quantity > LOW_STOCK_THRESHOLD {
            StockLevel::Healthy
        } else if stock_quantity > 0 {
            StockLevel::Low
        } else {
            StockLevel::Out
        }
    }
}

/// Trim, drop blanks and repeats, keep first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Result<Vec<String>, CatalogError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }

    if out.len() > MAX_TAGS {
        return Err(CatalogError::TooManyTags);
    }
    Ok(out)
}
