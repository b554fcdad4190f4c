use serde_json::{Map, Value};

pub const MIN_PRICE: f64 = 1.0;
pub const MAX_PRICE: f64 = 30.0;

/// Text reported to callers for every validation failure, whatever the cause.
pub const VALIDATION_MESSAGE: &str = "validation errors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body is not a JSON object")]
    MalformedBody,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("price must be a number")]
    PriceNotNumeric,
    #[error("price must be between 1 and 30")]
    PriceOutOfRange,
    #[error("pizza does not exist")]
    UnknownPizza,
    #[error("restaurant does not exist")]
    UnknownRestaurant,
}

/// A create-offering payload with every required key present.
///
/// Values are kept as raw JSON: checking them is the catalog's job, inside the
/// same transaction that performs the insert.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferingRequest {
    pub price: Value,
    pub pizza_id: Value,
    pub restaurant_id: Value,
}

impl OfferingRequest {
    pub fn from_json(body: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut fields) = body else {
            return Err(ValidationError::MalformedBody);
        };

        Ok(Self {
            price: take_field(&mut fields, "price")?,
            pizza_id: take_field(&mut fields, "pizza_id")?,
            restaurant_id: take_field(&mut fields, "restaurant_id")?,
        })
    }
}

fn take_field(
    fields: &mut Map<String, Value>,
    name: &'static str,
) -> Result<Value, ValidationError> {
    fields.remove(name).ok_or(ValidationError::MissingField(name))
}

pub fn check_price(price: &Value) -> Result<f64, ValidationError> {
    let price = price.as_f64().ok_or(ValidationError::PriceNotNumeric)?;
    if (MIN_PRICE..=MAX_PRICE).contains(&price) {
        Ok(price)
    } else {
        Err(ValidationError::PriceOutOfRange)
    }
}

/// Interprets a foreign key from the payload. Anything but an integer that
/// fits a row id cannot reference an existing row.
pub fn reference_id(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|id| i32::try_from(id).ok())
}
