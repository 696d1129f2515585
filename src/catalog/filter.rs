use std::str::FromStr;

use crate::models::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Available,
    OutOfStock,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Available" | "available" => Ok(StatusFilter::Available),
            "Out of Stock" | "out_of_stock" | "out-of-stock" => Ok(StatusFilter::OutOfStock),
            other => Err(format!("Unknown status filter: {other}")),
        }
    }
}

/// Listing filters for the products page. Every set criterion must match.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<StatusFilter>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product) && self.matches_category(product) && self.matches_status(product)
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }

    // Case-insensitive substring over title, description and tags.
    fn matches_search(&self, product: &Product) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        product.title.to_lowercase().contains(&term)
            || product.description.to_lowercase().contains(&term)
            || product
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&term))
    }

    fn matches_category(&self, product: &Product) -> bool {
        match self.category_id.as_deref() {
            Some(id) if !id.is_empty() => product.category_id == id,
            _ => true,
        }
    }

    fn matches_status(&self, product: &Product) -> bool {
        match self.status {
            Some(StatusFilter::Available) => product.is_available,
            Some(StatusFilter::OutOfStock) => !product.is_available,
            None => true,
        }
    }
}
