//! Catalog payloads and listing helpers.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Full product record (`GET /products/:id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: String,
}

/// Catalog listing row (`GET /products`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

/// A product without an ID, as sent to `POST /products` and
/// `PUT /products/:id`.
///
/// On update the backend keeps the stored value for any text field sent
/// empty and for a stock of zero. Price is always overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
    pub image: String,
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProductSort {
    /// Backend order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl ProductSort {
    /// All sort orders, for help text.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
    ];

    /// The option name, e.g. `price-asc`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| format!("invalid sort: {s}"))
    }
}

fn by_name(a: &ProductListItem, b: &ProductListItem) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Filter a listing by a case-insensitive name query and sort it.
///
/// A blank query keeps every item. Sorting is stable, so equal keys keep
/// the backend's order.
#[must_use]
pub fn search_and_sort(
    items: &[ProductListItem],
    query: &str,
    sort: ProductSort,
) -> Vec<ProductListItem> {
    let query = query.trim().to_lowercase();
    let mut list: Vec<ProductListItem> = items
        .iter()
        .filter(|p| query.is_empty() || p.name.to_lowercase().contains(&query))
        .cloned()
        .collect();

    match sort {
        ProductSort::Default => {}
        ProductSort::PriceAsc => list.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::PriceDesc => list.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSort::NameAsc => list.sort_by(by_name),
        ProductSort::NameDesc => list.sort_by(|a, b| by_name(b, a)),
    }
    list
}
