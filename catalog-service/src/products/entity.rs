//! Product record and its write payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{Changeset, Entity, FilterValue, Insertable, MemoryRecord};

/// A catalog product
///
/// Serialized in camelCase: `{ id, name, price, stockQuantity, createdAt, updatedAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "TV"))]
    pub name: String,
    /// Two decimal places
    #[cfg_attr(feature = "openapi", schema(example = 1569.25))]
    pub price: f64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock_quantity: i32,
}

/// Validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i32>,
}

/// Map an API field name to its column, for ordering
///
/// ```rust
/// use catalog_service::products::column_for_field;
///
/// assert_eq!(column_for_field("stockQuantity"), Some("stock_quantity"));
/// assert_eq!(column_for_field("stock_quantity"), None);
/// ```
pub fn column_for_field(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "name" => Some("name"),
        "price" => Some("price"),
        "stockQuantity" => Some("stock_quantity"),
        "createdAt" => Some("created_at"),
        "updatedAt" => Some("updated_at"),
        _ => None,
    }
}

impl Entity for Product {
    type Id = i64;
    type Create = NewProduct;
    type Update = ProductChanges;

    const NAME: &'static str = "Product";
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "price",
        "stock_quantity",
        "created_at",
        "updated_at",
    ];
    // NUMERIC(10,2) is read back as FLOAT8 so it decodes into f64
    const PROJECTION: &'static str =
        "id, name, price::FLOAT8 AS price, stock_quantity, created_at, updated_at";
    const UPDATED_AT_COLUMN: Option<&'static str> = Some("updated_at");

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "price" => Some(self.price.into()),
            "stock_quantity" => Some(self.stock_quantity.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Insertable for NewProduct {
    fn values(&self) -> Vec<(&'static str, FilterValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("price", self.price.into()),
            ("stock_quantity", self.stock_quantity.into()),
        ]
    }
}

impl Changeset for ProductChanges {
    fn changes(&self) -> Vec<(&'static str, FilterValue)> {
        let mut changes = Vec::new();
        if let Some(name) = &self.name {
            changes.push(("name", name.clone().into()));
        }
        if let Some(price) = self.price {
            changes.push(("price", price.into()));
        }
        if let Some(stock_quantity) = self.stock_quantity {
            changes.push(("stock_quantity", stock_quantity.into()));
        }
        changes
    }
}

impl MemoryRecord for Product {
    fn from_insert(id: i64, payload: &NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: payload.name.clone(),
            price: payload.price,
            stock_quantity: payload.stock_quantity,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_changes(&mut self, changes: &ProductChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(stock_quantity) = changes.stock_quantity {
            self.stock_quantity = stock_quantity;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> Product {
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Product {
            id: 1,
            name: "TV".to_string(),
            price: 1569.25,
            stock_quantity: 5,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(product()).unwrap(),
            json!({
                "id": 1,
                "name": "TV",
                "price": 1569.25,
                "stockQuantity": 5,
                "createdAt": "2024-03-01T12:00:00Z",
                "updatedAt": "2024-03-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_every_column_is_readable() {
        let product = product();
        for column in Product::COLUMNS {
            assert!(product.column(column).is_some(), "{column}");
        }
        assert!(product.column("colour").is_none());
    }

    #[test]
    fn test_every_api_field_maps_to_a_declared_column() {
        for field in ["id", "name", "price", "stockQuantity", "createdAt", "updatedAt"] {
            let column = column_for_field(field).unwrap();
            assert!(Product::COLUMNS.contains(&column));
        }
    }

    #[test]
    fn test_changes_only_include_present_fields() {
        let changes = ProductChanges {
            price: Some(10.5),
            ..ProductChanges::default()
        };
        assert_eq!(changes.changes(), vec![("price", FilterValue::Float(10.5))]);
        assert!(ProductChanges::default().is_empty());
    }

    #[test]
    fn test_apply_changes_refreshes_updated_at() {
        let mut product = product();
        let later = product.created_at + chrono::Duration::seconds(30);
        product.apply_changes(
            &ProductChanges {
                stock_quantity: Some(9),
                ..ProductChanges::default()
            },
            later,
        );
        assert_eq!(product.stock_quantity, 9);
        assert_eq!(product.name, "TV");
        assert_eq!(product.updated_at, later);
        assert!(product.created_at < later);
    }

    #[test]
    fn test_insert_values_order() {
        let payload = NewProduct {
            name: "TV".to_string(),
            price: 1.0,
            stock_quantity: 2,
        };
        let columns: Vec<_> = payload.values().into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, ["name", "price", "stock_quantity"]);
    }
}
