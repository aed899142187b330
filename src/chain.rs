//! Replaying textual builder chains.
//!
//! A [`Chain`] is the parsed form of `select("id").where("age").gte(18)`.
//! [`Chain::apply`] feeds each call to a [`QueryBuilder`], converting the
//! loosely typed literal arguments the way the builder's dynamic callers
//! pass them: `where` with an object merges raw entries, array operators
//! take either one array or a list of scalars, and so on.

use crate::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};
use crate::operators::{Operator, OperatorKind};
use crate::options::FindOptions;
use serde_json::Value;
use tracing::trace;

/// One method call in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Value>,
}

impl Call {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    fn arity(&self, expected: &'static str) -> QueryError {
        QueryError::arity(&self.method, expected, self.args.len())
    }

    fn invalid(&self, message: impl Into<String>) -> QueryError {
        QueryError::invalid(&self.method, message)
    }

    /// Apply this call to `builder`.
    fn apply(&self, builder: QueryBuilder, strict: bool) -> QueryResult<QueryBuilder> {
        trace!(method = %self.method, args = self.args.len(), "replaying call");

        match self.method.as_str() {
            "select" => self.select(builder),
            "where" => self.filter(builder),
            "order" => self.order(builder),
            "limit" => Ok(builder.limit(self.count()?)),
            "offset" => Ok(builder.offset(self.count()?)),
            name => match Operator::from_method(name) {
                Some(op) => self.operator(builder, op, strict),
                None => Err(QueryError::UnknownMethod(self.method.clone())),
            },
        }
    }

    fn select(&self, builder: QueryBuilder) -> QueryResult<QueryBuilder> {
        let mut fields = Vec::new();
        for arg in &self.args {
            match arg {
                Value::String(field) => fields.push(field.clone()),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(field) => fields.push(field.clone()),
                            other => {
                                return Err(self.invalid(format!(
                                    "expected a field name inside the array, got {}",
                                    other
                                )));
                            }
                        }
                    }
                }
                other => {
                    return Err(self.invalid(format!(
                        "expected a field name or an array of field names, got {}",
                        other
                    )));
                }
            }
        }
        Ok(builder.select(fields))
    }

    fn filter(&self, builder: QueryBuilder) -> QueryResult<QueryBuilder> {
        match self.args.as_slice() {
            [Value::Object(map)] | [Value::Object(map), _] => Ok(builder.where_raw(map.clone())),
            [Value::String(field)] => Ok(builder.where_field(field.as_str())),
            [Value::String(field), value] => Ok(builder.where_eq(field.as_str(), value.clone())),
            [other] | [other, _] => Err(self.invalid(format!(
                "expected a field name or an object, got {}",
                other
            ))),
            _ => Err(self.arity("1 or 2")),
        }
    }

    fn operator(
        &self,
        builder: QueryBuilder,
        op: Operator,
        strict: bool,
    ) -> QueryResult<QueryBuilder> {
        let value = match op.kind() {
            OperatorKind::Comparator => match self.args.as_slice() {
                [value] => value.clone(),
                _ => return Err(self.arity("exactly 1")),
            },
            OperatorKind::Array => match self.args.as_slice() {
                [list @ Value::Array(_), ..] => list.clone(),
                scalars => Value::Array(scalars.to_vec()),
            },
        };

        if strict {
            builder.try_op(op, value)
        } else {
            Ok(builder.op(op, value))
        }
    }

    fn order(&self, builder: QueryBuilder) -> QueryResult<QueryBuilder> {
        match self.args.as_slice() {
            [Value::String(term)] => Ok(builder.order(term.as_str())),
            [Value::Array(pair)] => match pair.as_slice() {
                [Value::String(field), Value::String(direction)] => {
                    Ok(builder.order_by(field.as_str(), direction.as_str()))
                }
                _ => Err(self.invalid("expected a [field, direction] pair")),
            },
            [Value::String(field), Value::String(direction)] => {
                Ok(builder.order_by(field.as_str(), direction.as_str()))
            }
            [_] | [_, _] => Err(self.invalid("expected string arguments")),
            _ => Err(self.arity("1 or 2")),
        }
    }

    /// The single non-negative integer argument of `limit`/`offset`.
    fn count(&self) -> QueryResult<u64> {
        match self.args.as_slice() {
            [value] => value
                .as_u64()
                .ok_or_else(|| self.invalid(format!("expected a non-negative integer, got {}", value))),
            _ => Err(self.arity("exactly 1")),
        }
    }
}

/// A parsed builder chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    calls: Vec<Call>,
}

impl Chain {
    pub fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Replay every call against `builder`.
    ///
    /// A leading `builder()` or `QueryBuilder()` call and a final `build()`
    /// are accepted and ignored. With `strict`, an operator called before
    /// any `where(field)` is an error instead of a no-op.
    pub fn apply(&self, mut builder: QueryBuilder, strict: bool) -> QueryResult<QueryBuilder> {
        let last = self.calls.len().saturating_sub(1);

        for (i, call) in self.calls.iter().enumerate() {
            match call.method.as_str() {
                "builder" | "QueryBuilder" if i == 0 => {
                    if !call.args.is_empty() {
                        return Err(call.arity("no"));
                    }
                }
                "build" => {
                    if i != last {
                        return Err(call.invalid("build() must be the last call"));
                    }
                    if !call.args.is_empty() {
                        return Err(call.arity("no"));
                    }
                }
                _ => builder = call.apply(builder, strict)?,
            }
        }

        Ok(builder)
    }

    /// Replay against a fresh builder and build the document.
    pub fn build(&self, strict: bool) -> QueryResult<FindOptions> {
        Ok(self.apply(QueryBuilder::new(), strict)?.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(input: &str) -> QueryResult<Value> {
        parse(input)?.build(false)?.to_value()
    }

    #[test]
    fn test_select_flattens_one_level() {
        assert_eq!(
            run(r#"select("a", ["b", "c"]).select("d")"#).unwrap(),
            json!({ "attributes": ["a", "b", "c", "d"] })
        );
        assert!(matches!(
            run(r#"select([["a"]])"#),
            Err(QueryError::InvalidArgument { .. })
        ));
        assert!(matches!(run("select(1)"), Err(QueryError::InvalidArgument { .. })));
    }

    #[test]
    fn test_where_forms() {
        assert_eq!(
            run(r#"where({ foo: "bar" })"#).unwrap(),
            json!({ "where": { "foo": "bar" } })
        );
        assert_eq!(
            run(r#"where("foo", "bar")"#).unwrap(),
            json!({ "where": { "foo": { "$eq": "bar" } } })
        );
        assert_eq!(run(r#"where("foo")"#).unwrap(), json!({ "where": { "foo": {} } }));
        assert_eq!(
            run(r#"where({ foo: "bar" }, 1)"#).unwrap(),
            json!({ "where": { "foo": "bar" } })
        );
        assert_eq!(
            run(r#"where("deleted", false)"#).unwrap(),
            json!({ "where": { "deleted": { "$eq": false } } })
        );
    }

    #[test]
    fn test_where_errors() {
        assert!(matches!(run("where()"), Err(QueryError::Arity { .. })));
        assert!(matches!(run("where(1)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(
            run(r#"where("a", 1, 2)"#),
            Err(QueryError::Arity { .. })
        ));
    }

    #[test]
    fn test_array_operator_argument_forms() {
        let variadic = run(r#"where("id").in(1, 2)"#).unwrap();
        let list = run(r#"where("id").in([1, 2])"#).unwrap();
        assert_eq!(variadic, list);
        assert_eq!(list, json!({ "where": { "id": { "$in": [1, 2] } } }));

        assert_eq!(
            run(r#"where("id").notIn(7)"#).unwrap(),
            json!({ "where": { "id": { "$notIn": [7] } } })
        );
        assert_eq!(
            run(r#"where("id").in([1, 2], 3)"#).unwrap(),
            json!({ "where": { "id": { "$in": [1, 2] } } })
        );
    }

    #[test]
    fn test_operator_spellings() {
        assert_eq!(
            run(r#"where("name").notIlike("%x%").not_like("y%")"#).unwrap(),
            json!({ "where": { "name": { "$notILike": "%x%", "$notLike": "y%" } } })
        );
    }

    #[test]
    fn test_comparator_arity() {
        assert!(matches!(run(r#"where("a").eq()"#), Err(QueryError::Arity { .. })));
        assert!(matches!(run(r#"where("a").eq(1, 2)"#), Err(QueryError::Arity { .. })));
    }

    #[test]
    fn test_operator_without_where() {
        assert_eq!(run("eq(1)").unwrap(), json!({}));

        let err = parse("eq(1)").unwrap().build(true).unwrap_err();
        assert!(matches!(err, QueryError::NoActiveField { method: "eq" }));
    }

    #[test]
    fn test_order_forms() {
        assert_eq!(
            run(r#"order("a DESC").order("b", "ASC").order(["c", "DESC"])"#).unwrap(),
            json!({ "order": ["a DESC", ["b", "ASC"], ["c", "DESC"]] })
        );
        assert!(matches!(run("order(1)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(run("order()"), Err(QueryError::Arity { .. })));
    }

    #[test]
    fn test_pagination() {
        assert_eq!(
            run("limit(10).limit(11).offset(0)").unwrap(),
            json!({ "limit": 11, "offset": 0 })
        );
        assert!(matches!(run("limit(-1)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(run("limit(1.5)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(run("offset()"), Err(QueryError::Arity { .. })));
    }

    #[test]
    fn test_builder_and_build_calls() {
        assert_eq!(run("builder().limit(1).build()").unwrap(), json!({ "limit": 1 }));
        assert!(matches!(
            run("build().limit(1)"),
            Err(QueryError::InvalidArgument { .. })
        ));
        assert!(matches!(
            run("limit(1).builder()"),
            Err(QueryError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_unknown_method() {
        match run("groupBy(\"a\")") {
            Err(QueryError::UnknownMethod(name)) => assert_eq!(name, "groupBy"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
