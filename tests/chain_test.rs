use findopts::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_text_chain_matches_builder() {
    let text = r#"
        select("id")
            .where("status", "active")
            .where("age").gte(18)
            .order("age", "DESC")
            .limit(5)
            .offset(10)
            .build()
    "#;
    let from_text = findopts::parse(text).unwrap().build(false).unwrap();

    let from_code = QueryBuilder::new()
        .select("id")
        .where_eq("status", "active")
        .where_field("age")
        .gte(18)
        .order_by("age", "DESC")
        .limit(5)
        .offset(10)
        .build();

    assert_eq!(from_text, from_code);
}

#[test]
fn test_apply_continues_existing_builder() {
    let base = QueryBuilder::new().select("id").where_field("age");
    let chain = findopts::parse("gte(21).limit(2)").unwrap();
    let opts = chain.apply(base, true).unwrap().build();

    assert_eq!(
        opts.to_value().unwrap(),
        json!({ "attributes": ["id"], "where": { "age": { "$gte": 21 } }, "limit": 2 })
    );
}

#[test]
fn test_raw_merge_clears_context() {
    let chain = findopts::parse(r#"where("a").where({ b: 1 }).eq(2)"#).unwrap();

    let lenient = chain.build(false).unwrap();
    assert_eq!(
        lenient.to_value().unwrap(),
        json!({ "where": { "a": {}, "b": 1 } })
    );

    let strict = chain.build(true).unwrap_err();
    assert!(matches!(strict, QueryError::NoActiveField { method: "eq" }));
}

#[test]
fn test_parse_error_reports_position() {
    let err = findopts::parse(r#"select("id").where("a"]"#).unwrap_err();
    assert!(matches!(err, QueryError::Parse { .. }));
    assert!(err.to_string().starts_with("Parse error at position"));
}
