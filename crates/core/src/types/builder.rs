//! Bulk product builder.
//!
//! Admins add products in batches: a list of draft rows that can be added,
//! duplicated, removed, edited field by field, or imported from a pasted
//! JSON array, then validated and posted to `POST /products` in one call.
//! Every row carries a stable key so edits address the right row after
//! insertions and removals.

use core::fmt;
use core::str::FromStr;

use serde_json::Value;
use uuid::Uuid;

use super::catalog::NewProduct;
use super::price::Price;

/// Errors produced by the builder.
#[derive(thiserror::Error, Debug)]
pub enum BuilderError {
    /// Imported text is not JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Imported JSON is not an array.
    #[error("expected a JSON array of products")]
    NotArray,

    /// No row has the given key.
    #[error("no draft row with key {0}")]
    UnknownRow(Uuid),

    /// One or more rows fail validation.
    #[error("{} row(s) have errors", .0.len())]
    InvalidRows(Vec<RowErrors>),
}

/// An editable field of a draft row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Description,
    Price,
    Stock,
    Image,
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            "image" => Ok(Self::Image),
            _ => Err(format!("unknown field: {s}")),
        }
    }
}

/// One draft product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRow {
    pub key: Uuid,
    pub product: NewProduct,
}

impl DraftRow {
    fn empty() -> Self {
        Self {
            key: Uuid::new_v4(),
            product: NewProduct::default(),
        }
    }

    fn is_pristine(&self) -> bool {
        self.product.name.is_empty() && self.product.price == Price::ZERO
    }

    /// Validate this row.
    #[must_use]
    pub fn validate(&self) -> RowErrors {
        let p = &self.product;
        RowErrors {
            key: self.key,
            name: p.name.trim().is_empty().then_some("name is required"),
            price: (!p.price.is_positive()).then_some("price must be greater than 0"),
            stock: (p.stock < 0).then_some("stock cannot be negative"),
        }
    }
}

/// Validation result for one row; `None` fields are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowErrors {
    pub key: Uuid,
    pub name: Option<&'static str>,
    pub price: Option<&'static str>,
    pub stock: Option<&'static str>,
}

impl RowErrors {
    /// Whether the row is valid.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }

    /// The messages that apply, in field order.
    pub fn messages(&self) -> impl Iterator<Item = &'static str> {
        [self.name, self.price, self.stock].into_iter().flatten()
    }
}

impl fmt::Display for RowErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.messages().collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Numeric input as the builder reads it: a number, or a string holding
/// one. Anything else is zero.
fn sanitize_price(value: &Value) -> Price {
    match value {
        Value::Number(_) => serde_json::from_value(value.clone()).unwrap_or(Price::ZERO),
        Value::String(s) => s.parse().unwrap_or(Price::ZERO),
        _ => Price::ZERO,
    }
}

fn sanitize_stock(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Ordered list of draft rows. Never empty.
#[derive(Debug, Clone)]
pub struct BulkBuilder {
    rows: Vec<DraftRow>,
}

impl Default for BulkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkBuilder {
    /// A builder with one empty row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![DraftRow::empty()],
        }
    }

    /// The current rows.
    #[must_use]
    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append an empty row and return its key.
    pub fn add(&mut self) -> Uuid {
        let row = DraftRow::empty();
        let key = row.key;
        self.rows.push(row);
        key
    }

    /// Append `count` empty rows.
    pub fn add_many(&mut self, count: usize) {
        self.rows.extend((0..count).map(|_| DraftRow::empty()));
    }

    /// Insert a copy of a row right after it, returning the copy's key.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownRow`] if no row has `key`.
    pub fn duplicate(&mut self, key: Uuid) -> Result<Uuid, BuilderError> {
        let index = self.index_of(key)?;
        let copy = DraftRow {
            key: Uuid::new_v4(),
            product: self.rows.get(index).map(|r| r.product.clone()).unwrap_or_default(),
        };
        let copy_key = copy.key;
        self.rows.insert(index + 1, copy);
        Ok(copy_key)
    }

    /// Remove a row. Removing the only row leaves a fresh empty row.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownRow`] if no row has `key`.
    pub fn remove(&mut self, key: Uuid) -> Result<(), BuilderError> {
        let index = self.index_of(key)?;
        if self.rows.len() <= 1 {
            self.clear();
        } else {
            self.rows.remove(index);
        }
        Ok(())
    }

    /// Reset to a single empty row.
    pub fn clear(&mut self) {
        self.rows = vec![DraftRow::empty()];
    }

    /// Set one field of a row from text input. Numeric fields that do not
    /// parse become zero.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownRow`] if no row has `key`.
    pub fn update(&mut self, key: Uuid, field: DraftField, value: &str) -> Result<(), BuilderError> {
        let index = self.index_of(key)?;
        let Some(row) = self.rows.get_mut(index) else {
            return Err(BuilderError::UnknownRow(key));
        };
        let product = &mut row.product;
        match field {
            DraftField::Name => value.clone_into(&mut product.name),
            DraftField::Description => value.clone_into(&mut product.description),
            DraftField::Image => value.clone_into(&mut product.image),
            DraftField::Price => product.price = value.parse().unwrap_or(Price::ZERO),
            DraftField::Stock => product.stock = value.trim().parse().unwrap_or(0),
        }
        Ok(())
    }

    /// Import rows from a pasted JSON array, returning how many were added.
    ///
    /// Each element's `name`, `description` and `image` are read as text and
    /// `price` and `stock` as numbers (zero when unusable). If the builder
    /// holds only its untouched starting row, the import replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidJson`] or [`BuilderError::NotArray`].
    pub fn import_json(&mut self, text_input: &str) -> Result<usize, BuilderError> {
        let parsed: Value = serde_json::from_str(text_input)?;
        let Value::Array(items) = parsed else {
            return Err(BuilderError::NotArray);
        };

        let imported: Vec<DraftRow> = items
            .iter()
            .map(|raw| DraftRow {
                key: Uuid::new_v4(),
                product: NewProduct {
                    name: text(raw.get("name")),
                    description: text(raw.get("description")),
                    price: raw.get("price").map_or(Price::ZERO, sanitize_price),
                    stock: raw.get("stock").map_or(0, sanitize_stock),
                    image: text(raw.get("image")),
                },
            })
            .collect();
        let count = imported.len();

        let pristine = matches!(self.rows.as_slice(), [only] if only.is_pristine());
        if pristine {
            self.rows = imported;
            if self.rows.is_empty() {
                self.clear();
            }
        } else {
            self.rows.extend(imported);
        }
        Ok(count)
    }

    /// Validate every row, returning only rows with errors.
    #[must_use]
    pub fn validate(&self) -> Vec<RowErrors> {
        self.rows
            .iter()
            .map(DraftRow::validate)
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// The products to post, if every row is valid.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidRows`] listing each failing row.
    pub fn payload(&self) -> Result<Vec<NewProduct>, BuilderError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(BuilderError::InvalidRows(errors));
        }
        Ok(self.rows.iter().map(|r| r.product.clone()).collect())
    }

    /// Pretty JSON of the rows as they would be posted, valid or not.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn preview(&self) -> Result<String, serde_json::Error> {
        let products: Vec<&NewProduct> = self.rows.iter().map(|r| &r.product).collect();
        serde_json::to_string_pretty(&products)
    }

    fn index_of(&self, key: Uuid) -> Result<usize, BuilderError> {
        self.rows
            .iter()
            .position(|r| r.key == key)
            .ok_or(BuilderError::UnknownRow(key))
    }
}
