//! Request payloads and their validation
//!
//! Bodies are read into loosely typed DTOs so that a wrong type is reported as
//! a validation message instead of a deserialization failure. `validate`
//! collects every violation, in field order, before returning.

use serde::Deserialize;
use serde_json::Value;

use crate::crud::FindAllParams;
use crate::handlers::{ListQuery, ListRequest};
use crate::repository::{FilterCondition, OrderBy};

use super::entity::{column_for_field, NewProduct, ProductChanges};
use super::TABLE_ALIAS;

/// Largest value a NUMERIC(10,2) column holds
const MAX_PRICE: f64 = 99_999_999.99;

struct NumberRules {
    required: &'static str,
    number: &'static str,
    positive: &'static str,
    min: f64,
    min_message: &'static str,
}

const PRICE_RULES: NumberRules = NumberRules {
    required: "Preco é um campo obrigatório",
    number: "Preco deve ser um número",
    positive: "Preço deve ser um número positivo",
    min: 0.1,
    min_message: "Preço deve ser maior que zero",
};

const QUANTITY_RULES: NumberRules = NumberRules {
    required: "Quantidade é um campo obrigatório",
    number: "Quantidade deve ser um número",
    positive: "Quantidade deve ser um número positivo",
    min: 1.0,
    min_message: "Quantidade deve ser no mínimo 1",
};

fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn check_name(value: Option<&Value>, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.push("Nome é um campo obrigatório".to_string());
            None
        }
        None | Some(Value::Null) => {
            errors.push("Nome é um campo obrigatório".to_string());
            errors.push("Nome deve ser uma string".to_string());
            None
        }
        Some(_) => {
            errors.push("Nome deve ser uma string".to_string());
            None
        }
    }
}

/// Every rule is checked independently, so a missing value reports all of them
fn check_number(value: Option<&Value>, rules: &NumberRules, errors: &mut Vec<String>) -> Option<f64> {
    let number = value.and_then(Value::as_f64);
    let before = errors.len();

    if is_missing(value) {
        errors.push(rules.required.to_string());
    }
    if number.is_none() {
        errors.push(rules.number.to_string());
    }
    if !number.is_some_and(|n| n > 0.0) {
        errors.push(rules.positive.to_string());
    }
    if !number.is_some_and(|n| n >= rules.min) {
        errors.push(rules.min_message.to_string());
    }

    if errors.len() == before {
        number
    } else {
        None
    }
}

fn check_price(value: Option<&Value>, errors: &mut Vec<String>) -> Option<f64> {
    let price = check_number(value, &PRICE_RULES, errors)?;
    if price > MAX_PRICE {
        errors.push(format!("Preço deve ser no máximo {}", MAX_PRICE));
        return None;
    }
    Some((price * 100.0).round() / 100.0)
}

fn check_quantity(value: Option<&Value>, errors: &mut Vec<String>) -> Option<i32> {
    let quantity = check_number(value, &QUANTITY_RULES, errors)?;
    if quantity.fract() != 0.0 || quantity > f64::from(i32::MAX) {
        errors.push("Quantidade deve ser um número inteiro".to_string());
        return None;
    }
    Some(quantity as i32)
}

/// Body of `POST /products`
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDto {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "TV"))]
    pub name: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>, example = 1569.25))]
    pub price: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i32>, example = 5))]
    pub stock_quantity: Option<Value>,
}

impl CreateProductDto {
    /// Check every field and build the insert payload
    pub fn validate(&self) -> Result<NewProduct, Vec<String>> {
        let mut errors = Vec::new();
        let name = check_name(self.name.as_ref(), &mut errors);
        let price = check_price(self.price.as_ref(), &mut errors);
        let stock_quantity = check_quantity(self.stock_quantity.as_ref(), &mut errors);

        match (name, price, stock_quantity) {
            (Some(name), Some(price), Some(stock_quantity)) if errors.is_empty() => {
                Ok(NewProduct {
                    name,
                    price,
                    stock_quantity,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Body of `PATCH /products/{id}`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "TV"))]
    pub name: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<f64>, example = 1569.25))]
    pub price: Option<Value>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i32>, example = 5))]
    pub stock_quantity: Option<Value>,
}

impl UpdateProductDto {
    /// Check the fields that were sent and build the changeset
    ///
    /// `null` counts as not sent. At least one field is required.
    pub fn validate(&self) -> Result<ProductChanges, Vec<String>> {
        let mut errors = Vec::new();
        let mut changes = ProductChanges::default();

        if !is_missing(self.name.as_ref()) {
            changes.name = check_name(self.name.as_ref(), &mut errors);
        }
        if !is_missing(self.price.as_ref()) {
            changes.price = check_price(self.price.as_ref(), &mut errors);
        }
        if !is_missing(self.stock_quantity.as_ref()) {
            changes.stock_quantity = check_quantity(self.stock_quantity.as_ref(), &mut errors);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        if changes == ProductChanges::default() {
            return Err(vec!["Informe ao menos um campo para atualizar".to_string()]);
        }
        Ok(changes)
    }
}

/// Query string of `GET /products`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub min_quantity: Option<String>,
    #[serde(default)]
    pub max_quantity: Option<String>,
}

/// A numeric range bound read from the query string
trait RangeBound: std::str::FromStr {
    fn is_usable(&self) -> bool {
        true
    }
}

impl RangeBound for i64 {}

/// `NaN` and the infinities parse as `f64` but are not numbers to filter by
impl RangeBound for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

fn parse_bound<T: RangeBound>(
    raw: &Option<String>,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<T> {
    let raw = raw.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<T>() {
        Ok(value) if value.is_usable() => Some(value),
        _ => {
            errors.push(message.to_string());
            None
        }
    }
}

impl ProductListQuery {
    /// Validate the query and translate it into CRUD parameters
    ///
    /// Each range filter applies only when both of its bounds are given, and
    /// an empty `name` is ignored.
    pub fn validate(&self, max_per_page: u64) -> Result<FindAllParams, Vec<String>> {
        let (request, mut errors) = match self.list.validate(max_per_page) {
            Ok(request) => (request, Vec::new()),
            Err(errors) => (ListRequest::default(), errors),
        };

        let min_price: Option<f64> =
            parse_bound(&self.min_price, "Preco mínimo deve ser um número", &mut errors);
        let max_price: Option<f64> =
            parse_bound(&self.max_price, "Preco máximo deve ser um número", &mut errors);
        let min_quantity: Option<i64> = parse_bound(
            &self.min_quantity,
            "Quantidade mínima deve ser um numero",
            &mut errors,
        );
        let max_quantity: Option<i64> = parse_bound(
            &self.max_quantity,
            "Quantidade máxima deve ser um numero",
            &mut errors,
        );

        let order = match request.order {
            Some((field, direction)) => match column_for_field(&field) {
                Some(column) => Some(OrderBy::new(column, direction)),
                None => {
                    errors.push(format!("Campo de ordenação inválido: {}", field));
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let name = self.name.as_deref().filter(|n| !n.is_empty());

        Ok(FindAllParams {
            condition_filters: vec![
                FilterCondition::contains_opt("name", name),
                FilterCondition::between_opt("price", min_price, max_price),
                FilterCondition::between_opt("stock_quantity", min_quantity, max_quantity),
            ],
            order,
            page: request.page,
            per_page: request.per_page,
            ..FindAllParams::new(TABLE_ALIAS)
        })
    }
}
