use serde::{Deserialize, Serialize};

/// Column names of the cart-event wire format, in serialization order.
pub const CART_EVENT_COLUMNS: [&str; 5] = [
    "cart_id",
    "customer_id",
    "product_id",
    "product_amount",
    "product_price",
];

/// A single abandoned-cart line item as produced by the upstream generator.
///
/// `product_price` is decimal-tagged text and is carried opaquely; the
/// pipeline never does arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEvent {
    pub cart_id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub product_amount: i64,
    pub product_price: String,
}

/// A scalar field value used for group keys and field lookup.
///
/// Group membership tests use exact equality; there is no numeric coercion
/// between the variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// The numeric value, if this is an [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Field access by column name.
///
/// This is the seam between the aggregation engine and concrete record
/// types: the engine only ever sees named [`Value`]s, so any tabular record
/// can be grouped and reduced.
pub trait Tabular {
    /// Return the value of the named field, or `None` if the record does not
    /// carry it.
    fn field(&self, name: &str) -> Option<Value>;
}

impl Tabular for CartEvent {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "cart_id" => Some(Value::Int(self.cart_id)),
            "customer_id" => Some(Value::Int(self.customer_id)),
            "product_id" => Some(Value::Int(self.product_id)),
            "product_amount" => Some(Value::Int(self.product_amount)),
            "product_price" => Some(Value::Text(self.product_price.clone())),
            _ => None,
        }
    }
}
