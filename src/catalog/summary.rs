use serde::Serialize;

use crate::catalog::{round3, StockLevel};
use crate::models::{Category, Product};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category_id: String,
    pub title: String,
    pub product_count: usize,
    /// Share of all products, in percent with one decimal.
    pub percentage: f64,
}

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub product_count: usize,
    pub category_count: usize,
    pub available_count: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub total_stock_units: i64,
    pub stock_value_ttc: f64,
    /// Products pointing at a category that no longer exists.
    pub uncategorized_count: usize,
    pub categories: Vec<CategoryShare>,
}

impl SupplierSummary {
    pub fn build(categories: &[Category], products: &[Product]) -> Self {
        let total = products.len();
        let mut low_stock_count = 0;
        let mut out_of_stock_count = 0;
        for product in products {
            match product.stock_level() {
                StockLevel::Low => low_stock_count += 1,
                StockLevel::Out => out_of_stock_count += 1,
                StockLevel::Healthy => {}
            }
        }

        let shares: Vec<CategoryShare> = categories
            .iter()
            .map(|category| {
                let product_count = products
                    .iter()
                    .filter(|p| p.category_id == category.id)
                    .count();
                CategoryShare {
                    category_id: category.id.clone(),
                    title: category.title.clone(),
                    product_count,
                    percentage: share(product_count, total),
                }
            })
            .collect();

        let categorized: usize = shares.iter().map(|s| s.product_count).sum();

        Self {
            product_count: total,
            category_count: categories.len(),
            available_count: products.iter().filter(|p| p.is_available).count(),
            low_stock_count,
            out_of_stock_count,
            total_stock_units: products
                .iter()
                .fold(0i64, |acc, p| acc.saturating_add(p.stock_quantity.max(0))),
            stock_value_ttc: round3(
                products
                    .iter()
                    .map(|p| p.prix_ttc * p.stock_quantity.max(0) as f64)
                    .sum(),
            ),
            uncategorized_count: total - categorized,
            categories: shares,
        }
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
