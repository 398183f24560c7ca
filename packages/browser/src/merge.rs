//! Joins the product list with the versions currently selected for display

use ayon_core::{Product, ProductRow, Version};

/// Merge each product with the first remaining version that belongs to it.
///
/// Output order follows `products` and always has one row per product.
/// A matched version is consumed, so it never lands on a second row. Products
/// without a match keep whatever version fields the product list carried.
pub fn merge_products(products: &[Product], versions: &[Version]) -> Vec<ProductRow> {
    let mut pool: Vec<&Version> = versions.iter().collect();

    products
        .iter()
        .map(|product| {
            let row = ProductRow::from(product);
            match pool.iter().position(|v| v.product_id == product.id) {
                Some(index) => row.with_version(pool.remove(index)),
                None => row,
            }
        })
        .collect()
}

/// Version ids shown on the rows of `product_ids`, in row order
pub fn version_ids_for(rows: &[ProductRow], product_ids: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for row in rows.iter().filter(|row| product_ids.contains(&row.id)) {
        if let Some(version_id) = row.version_id() {
            if !ids.iter().any(|id| id == version_id) {
                ids.push(version_id.to_string());
            }
        }
    }
    ids
}
