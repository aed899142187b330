//! The options document produced by [`QueryBuilder::build`].
//!
//! These types serialize to the plain structure a Sequelize-style `find`
//! call consumes:
//!
//! ```text
//! {
//!   "attributes": ["id", "email"],
//!   "where": { "age": { "$gte": 18 }, "role": "admin" },
//!   "order": ["name ASC", ["created_at", "DESC"]],
//!   "limit": 10,
//!   "offset": 20
//! }
//! ```
//!
//! [`QueryBuilder::build`]: crate::builder::QueryBuilder::build

use crate::error::QueryResult;
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Per-field operator clause: operator marker → value.
///
/// One value per operator; writing an operator again replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause(BTreeMap<Operator, Value>);

impl Clause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of an operator, returning the previous one.
    pub fn insert(&mut self, op: Operator, value: Value) -> Option<Value> {
        self.0.insert(op, value)
    }

    pub fn get(&self, op: Operator) -> Option<&Value> {
        self.0.get(&op)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, &Value)> {
        self.0.iter().map(|(op, v)| (*op, v))
    }

    /// Read a clause back out of a raw JSON object whose keys are all
    /// operator markers. Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        object
            .iter()
            .map(|(key, v)| Operator::from_marker(key).map(|op| (op, v.clone())))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Self)
    }
}

impl FromIterator<(Operator, Value)> for Clause {
    fn from_iter<I: IntoIterator<Item = (Operator, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Filter entry for one field.
///
/// Untagged on the wire: when read back from JSON, any object whose keys
/// are all operator markers (the empty object included) comes back as
/// [`Filter::Clause`], even if it was stored through `where_raw`. The
/// serialized document is the same either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    /// Operator clause built through `where_field` and the operator methods.
    Clause(Clause),
    /// Value stored verbatim by `where_raw`.
    Raw(Value),
}

impl Filter {
    /// Write `value` under `op`.
    ///
    /// A raw object takes the marker as one more key. Any other raw value
    /// is replaced by a clause holding just this operator.
    pub fn set(&mut self, op: Operator, value: Value) {
        match self {
            Filter::Clause(clause) => {
                clause.insert(op, value);
            }
            Filter::Raw(Value::Object(map)) => {
                map.insert(op.marker().to_string(), value);
            }
            Filter::Raw(_) => *self = Filter::Clause(Clause::from_iter([(op, value)])),
        }
    }

    pub fn as_clause(&self) -> Option<&Clause> {
        match self {
            Filter::Clause(clause) => Some(clause),
            Filter::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Filter::Raw(value) => Some(value),
            Filter::Clause(_) => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

/// One entry of the `order` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderTerm {
    /// Pre-formatted term, e.g. `"name DESC"`.
    Raw(String),
    /// `[field, direction]` pair.
    Pair(String, String),
}

/// Options document. Absent keys are omitted on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<OrderTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl FindOptions {
    /// True when no key would be emitted.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_none()
            && self.filters.is_none()
            && self.order.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    /// Filter entry for a field, if any.
    pub fn filter(&self, field: &str) -> Option<&Filter> {
        self.filters.as_ref()?.get(field)
    }

    pub fn to_value(&self) -> QueryResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> QueryResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> QueryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
