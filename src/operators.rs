//! Operator vocabulary.
//!
//! Every filter operator the builder knows is listed once in [`OPERATORS`].
//! The table pairs the builder method name with the wire marker the
//! downstream executor expects. The markers are a compatibility contract
//! and must not change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Filter operators, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Equal (`$eq`)
    Eq,
    /// Not equal (`$ne`)
    Ne,
    /// Greater than (`$gt`)
    Gt,
    /// Greater than or equal (`$gte`)
    Gte,
    /// Less than (`$lt`)
    Lt,
    /// Less than or equal (`$lte`)
    Lte,
    /// Identity, e.g. `IS NULL` (`$is`)
    Is,
    /// Negated identity (`$not`)
    Not,
    /// Pattern match (`$like`)
    Like,
    /// Negated pattern match (`$notLike`)
    NotLike,
    /// Case-insensitive pattern match (`$iLike`)
    ILike,
    /// Negated case-insensitive pattern match (`$notILike`)
    NotILike,
    /// Set membership (`$in`)
    In,
    /// Negated set membership (`$notIn`)
    NotIn,
    /// Range (`$between`)
    Between,
    /// Negated range (`$notBetween`)
    NotBetween,
    /// Array overlap (`$overlap`)
    Overlap,
    /// Array containment (`$contains`)
    Contains,
    /// Array contained-by (`$contained`)
    Contained,
}

/// Operator family. Decides how method arguments are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Takes exactly one value.
    Comparator,
    /// Takes a list of values.
    Array,
}

/// One row of the operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDef {
    pub operator: Operator,
    /// Method name in the chain vocabulary (camelCase).
    pub method: &'static str,
    /// Method name on [`QueryBuilder`](crate::builder::QueryBuilder).
    pub rust_method: &'static str,
    /// Marker emitted in the options document.
    pub marker: &'static str,
    pub kind: OperatorKind,
}

const fn def(
    operator: Operator,
    method: &'static str,
    rust_method: &'static str,
    marker: &'static str,
    kind: OperatorKind,
) -> OperatorDef {
    OperatorDef {
        operator,
        method,
        rust_method,
        marker,
        kind,
    }
}

use OperatorKind::{Array, Comparator};

/// The operator table. Row `i` describes the operator with discriminant `i`.
pub static OPERATORS: [OperatorDef; 19] = [
    def(Operator::Eq, "eq", "eq", "$eq", Comparator),
    def(Operator::Ne, "ne", "ne", "$ne", Comparator),
    def(Operator::Gt, "gt", "gt", "$gt", Comparator),
    def(Operator::Gte, "gte", "gte", "$gte", Comparator),
    def(Operator::Lt, "lt", "lt", "$lt", Comparator),
    def(Operator::Lte, "lte", "lte", "$lte", Comparator),
    def(Operator::Is, "is", "is", "$is", Comparator),
    def(Operator::Not, "not", "not", "$not", Comparator),
    def(Operator::Like, "like", "like", "$like", Comparator),
    def(Operator::NotLike, "notLike", "not_like", "$notLike", Comparator),
    def(Operator::ILike, "ilike", "ilike", "$iLike", Comparator),
    def(Operator::NotILike, "notIlike", "not_ilike", "$notILike", Comparator),
    def(Operator::In, "in", "is_in", "$in", Array),
    def(Operator::NotIn, "notIn", "not_in", "$notIn", Array),
    def(Operator::Between, "between", "between", "$between", Array),
    def(Operator::NotBetween, "notBetween", "not_between", "$notBetween", Array),
    def(Operator::Overlap, "overlap", "overlap", "$overlap", Array),
    def(Operator::Contains, "contains", "contains", "$contains", Array),
    def(Operator::Contained, "contained", "contained", "$contained", Array),
];

impl Operator {
    /// Table row for this operator.
    pub fn def(self) -> &'static OperatorDef {
        &OPERATORS[self as usize]
    }

    /// Wire marker, e.g. `$gte`.
    pub fn marker(self) -> &'static str {
        self.def().marker
    }

    /// Chain method name, e.g. `notLike`.
    pub fn method(self) -> &'static str {
        self.def().method
    }

    pub fn kind(self) -> OperatorKind {
        self.def().kind
    }

    pub fn is_array(self) -> bool {
        self.kind() == OperatorKind::Array
    }

    /// Look up an operator by method name.
    ///
    /// Accepts the chain spelling (`notIlike`), the builder spelling
    /// (`not_ilike`) and `in_`/`r#in` for set membership.
    pub fn from_method(name: &str) -> Option<Self> {
        let name = name.strip_prefix("r#").unwrap_or(name);
        let name = if name == "in_" { "in" } else { name };
        OPERATORS
            .iter()
            .find(|d| d.method == name || d.rust_method == name)
            .map(|d| d.operator)
    }

    /// Look up an operator by its wire marker.
    pub fn from_marker(marker: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|d| d.marker == marker)
            .map(|d| d.operator)
    }

    /// All operators of one family, in table order.
    pub fn family(kind: OperatorKind) -> impl Iterator<Item = Operator> {
        OPERATORS
            .iter()
            .filter(move |d| d.kind == kind)
            .map(|d| d.operator)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

impl FromStr for Operator {
    type Err = String;

    /// Parses either a wire marker (`$gte`) or a method name (`gte`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_marker(s)
            .or_else(|| Self::from_method(s))
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.marker())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marker = String::deserialize(deserializer)?;
        Self::from_marker(&marker)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown operator marker '{}'", marker)))
    }
}
