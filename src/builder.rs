//! Fluent query builder.
//!
//! [`QueryBuilder`] accumulates selected fields, filters, ordering and
//! pagination across a chain of calls and turns them into a
//! [`FindOptions`] document on [`build`](QueryBuilder::build).
//!
//! Filters are written in two steps: `where_field` makes a field active,
//! then operator methods write into that field's clause.
//!
//! ```
//! use findopts::prelude::*;
//! use serde_json::json;
//!
//! let opts = QueryBuilder::new()
//!     .select("id")
//!     .where_eq("status", "active")
//!     .where_field("age").gte(18)
//!     .order_by("age", SortOrder::Desc)
//!     .limit(5)
//!     .build();
//!
//! assert_eq!(opts.to_value().unwrap(), json!({
//!     "attributes": ["id"],
//!     "where": { "status": { "$eq": "active" }, "age": { "$gte": 18 } },
//!     "order": [["age", "DESC"]],
//!     "limit": 5
//! }));
//! ```

use crate::error::{QueryError, QueryResult};
use crate::operators::Operator;
use crate::options::{Clause, Filter, FindOptions, OrderTerm};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Field names accepted by [`QueryBuilder::select`].
///
/// A single name or one flat sequence of names. Sequences are expanded in
/// place; nested sequences are not.
pub trait Selection {
    fn into_fields(self) -> Vec<String>;
}

impl Selection for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Selection for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl Selection for &String {
    fn into_fields(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: Into<String>, const N: usize> Selection for [S; N] {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>> Selection for Vec<S> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> Selection for &[S] {
    fn into_fields(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

/// Accumulates query intent and serializes it to [`FindOptions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    selected: Vec<String>,
    filters: BTreeMap<String, Filter>,
    ordering: Vec<OrderTerm>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Field targeted by the next operator call.
    context: Option<String>,
}

/// Generates one builder method per comparator operator.
macro_rules! comparators {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            #[doc = concat!("Set `", stringify!($name), "` on the active field. No-op without one.")]
            pub fn $name(self, value: impl Into<Value>) -> Self {
                self.op(Operator::$op, value)
            }
        )*
    };
}

/// Generates one builder method per array operator.
macro_rules! array_operators {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            #[doc = concat!("Set `", stringify!($name), "` on the active field. No-op without one.")]
            pub fn $name<I>(self, values: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<Value>,
            {
                self.op_list(Operator::$op, values)
            }
        )*
    };
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fields to `attributes`. Order is kept, duplicates are not removed.
    pub fn select(mut self, fields: impl Selection) -> Self {
        self.selected.extend(fields.into_fields());
        self
    }

    /// Make `field` the target of subsequent operator calls.
    ///
    /// The field gets an operator clause in `where`, empty until an
    /// operator writes to it. A raw object previously stored under the
    /// same key is kept, and operators add their markers next to its
    /// existing keys. Any other raw value is replaced by an empty clause.
    pub fn where_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        filter_mut(&mut self.filters, &field);
        self.context = Some(field);
        self
    }

    /// Shorthand for `where_field(field).eq(value)`.
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_field(field).eq(value)
    }

    /// Merge raw entries into `where`.
    ///
    /// Each key replaces whatever was stored for it, operator clause
    /// included. Keys not mentioned are left alone. Clears the active field.
    pub fn where_raw<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.context = None;
        for (key, value) in entries {
            self.filters.insert(key.into(), Filter::Raw(value.into()));
        }
        self
    }

    /// [`where_raw`](Self::where_raw) for a JSON document.
    ///
    /// Only objects are merged; any other value is ignored. The active
    /// field is cleared either way.
    pub fn where_json(self, value: Value) -> Self {
        match value {
            Value::Object(map) => self.where_raw(map),
            other => {
                debug!(value = %other, "ignoring non-object where() argument");
                self.where_raw(std::iter::empty::<(String, Value)>())
            }
        }
    }

    /// Write `value` under `op` on the active field.
    ///
    /// Replaces only that operator's previous value. Array operators always
    /// store a list: a non-array `value` is wrapped as `[value]`. Without an
    /// active field the call is discarded.
    pub fn op(mut self, op: Operator, value: impl Into<Value>) -> Self {
        self.apply(op, value.into());
        self
    }

    /// Like [`op`](Self::op), collecting `values` into a list first.
    pub fn op_list<I>(self, op: Operator, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.op(op, Value::Array(list))
    }

    /// Strict form of [`op`](Self::op): fails when no field is active.
    pub fn try_op(mut self, op: Operator, value: impl Into<Value>) -> QueryResult<Self> {
        if self.apply(op, value.into()) {
            Ok(self)
        } else {
            Err(QueryError::NoActiveField { method: op.method() })
        }
    }

    /// Strict form of [`op_list`](Self::op_list).
    pub fn try_op_list<I>(self, op: Operator, values: I) -> QueryResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.try_op(op, Value::Array(list))
    }

    fn apply(&mut self, op: Operator, value: Value) -> bool {
        let Some(field) = self.context.as_deref() else {
            debug!(operator = op.method(), "no active field, discarding operator");
            return false;
        };
        let value = match value {
            Value::Array(_) => value,
            scalar if op.is_array() => Value::Array(vec![scalar]),
            scalar => scalar,
        };
        filter_mut(&mut self.filters, field).set(op, value);
        true
    }

    comparators! {
        eq => Eq,
        ne => Ne,
        gt => Gt,
        gte => Gte,
        lt => Lt,
        lte => Lte,
        is => Is,
        not => Not,
        like => Like,
        not_like => NotLike,
        ilike => ILike,
        not_ilike => NotILike,
    }

    array_operators! {
        is_in => In,
        not_in => NotIn,
        between => Between,
        not_between => NotBetween,
        overlap => Overlap,
        contains => Contains,
        contained => Contained,
    }

    /// Append a pre-formatted order term, e.g. `"name DESC"`.
    pub fn order(mut self, term: impl Into<String>) -> Self {
        self.ordering.push(OrderTerm::Raw(term.into()));
        self
    }

    /// Append a `[field, direction]` order term.
    pub fn order_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.ordering
            .push(OrderTerm::Pair(field.into(), direction.into()));
        self
    }

    /// Set the row limit, replacing any previous one.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set the row offset, replacing any previous one.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// The field operator calls currently write to.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// True when `build` would produce an empty document.
    pub fn is_empty(&self) -> bool {
        self.build().is_empty()
    }

    /// Snapshot the accumulated state. Does not modify the builder.
    pub fn build(&self) -> FindOptions {
        FindOptions {
            attributes: non_empty(&self.selected),
            filters: (!self.filters.is_empty()).then(|| self.filters.clone()),
            order: non_empty(&self.ordering),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Filter entry for `field` that operators can write into, created if needed.
///
/// A raw object made only of operator markers becomes a clause. Other raw
/// objects stay raw. Scalars and arrays are replaced by an empty clause.
fn filter_mut<'a>(filters: &'a mut BTreeMap<String, Filter>, field: &str) -> &'a mut Filter {
    let entry = filters
        .entry(field.to_string())
        .or_insert_with(|| Filter::Clause(Clause::new()));
    let converted = match &*entry {
        Filter::Clause(_) => None,
        Filter::Raw(raw @ Value::Object(_)) => Clause::from_value(raw),
        Filter::Raw(_) => Some(Clause::new()),
    };
    if let Some(clause) = converted {
        *entry = Filter::Clause(clause);
    }
    entry
}
