//! Builder chain parser using nom.
//!
//! Parses the textual form of a builder chain into a [`Chain`].
//!
//! # Syntax Overview
//!
//! ```text
//! select("id").where("age").gte(18).in([1, 2]).order("age", "DESC").limit(5)
//! ───┬──────── ─────┬───── ───┬──── ────┬────── ──────────┬───────── ───┬────
//!    │              │         │         │                 │             │
//!    │              │         │         │                 │             └── Pagination
//!    │              │         │         │                 └── Order term
//!    │              │         │         └── Array operator
//!    │              │         └── Comparator on the active field
//!    │              └── Field context
//!    └── Attributes
//! ```
//!
//! Arguments are JSON-like literals: strings (single or double quoted),
//! numbers, `true`, `false`, `null`, `[arrays]` and `{objects}` whose keys
//! may be bare identifiers.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{map, opt, recognize, value},
    error::ErrorKind,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, tuple},
};
use serde_json::{Map, Value};

use crate::chain::{Call, Chain};
use crate::error::{QueryError, QueryResult};

/// Parse a complete builder chain.
pub fn parse(input: &str) -> QueryResult<Chain> {
    match parse_chain(input) {
        Ok(("", calls)) => Ok(Chain::new(calls)),
        Ok((remaining, _)) => Err(QueryError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(QueryError::parse(
            input.len() - e.input.len(),
            format!("expected {}, found '{}'", describe(e.code), snippet(e.input)),
        )),
        Err(nom::Err::Incomplete(_)) => Err(QueryError::parse(input.len(), "incomplete input")),
    }
}

fn describe(code: ErrorKind) -> &'static str {
    match code {
        ErrorKind::Char => "punctuation",
        ErrorKind::TakeWhile1 => "a method name",
        ErrorKind::Float => "a valid number",
        ErrorKind::SeparatedList => "a method call",
        _ => "an argument",
    }
}

fn snippet(input: &str) -> String {
    if input.is_empty() {
        return "end of input".to_string();
    }
    input.chars().take(20).collect()
}

/// Wrap a parser with optional surrounding whitespace.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse dot-separated calls, with an optional trailing semicolon.
fn parse_chain(input: &str) -> IResult<&str, Vec<Call>> {
    let (input, calls) = separated_list1(ws(char('.')), parse_call)(input)?;
    let (input, _) = opt(ws(char(';')))(input)?;
    Ok((input, calls))
}

/// Parse a single call: `name(arg, ...)`.
fn parse_call(input: &str) -> IResult<&str, Call> {
    let (input, method) = ws(parse_identifier)(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), parse_arg)(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, Call::new(method, args)))
}

/// Parse an identifier (method name, object key).
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '$')(input)
}

/// Parse an argument literal.
fn parse_arg(input: &str) -> IResult<&str, Value> {
    ws(alt((
        map(parse_string, Value::String),
        parse_array,
        parse_object,
        value(Value::Bool(true), tag("true")),
        value(Value::Bool(false), tag("false")),
        value(Value::Null, tag("null")),
        parse_number,
    )))(input)
}

/// Parse `[arg, ...]`.
fn parse_array(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('[')(input)?;
    let (input, items) = separated_list0(ws(char(',')), parse_arg)(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char(']'))(input)?;

    Ok((input, Value::Array(items)))
}

/// Parse `{key: arg, ...}`.
fn parse_object(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('{')(input)?;
    let (input, entries) = separated_list0(ws(char(',')), parse_entry)(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char('}'))(input)?;

    Ok((input, Value::Object(entries.into_iter().collect::<Map<_, _>>())))
}

/// Parse one `key: arg` object entry. Keys are quoted strings or bare identifiers.
fn parse_entry(input: &str) -> IResult<&str, (String, Value)> {
    let (input, key) = ws(alt((
        parse_string,
        map(parse_identifier, str::to_string),
    )))(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, val) = parse_arg(input)?;

    Ok((input, (key, val)))
}

/// Parse a JSON number (integer, fraction, exponent).
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, num_str) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    match serde_json::from_str::<Value>(num_str) {
        Ok(number) => Ok((rest, number)),
        Err(_) => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Float,
        ))),
    }
}

/// Parse a single- or double-quoted string with backslash escapes.
fn parse_string(input: &str) -> IResult<&str, String> {
    alt((quoted('"', "\\\""), quoted('\'', "\\'")))(input)
}

fn quoted<'a>(
    quote: char,
    stop: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input| {
        let (input, _) = char(quote)(input)?;
        let (input, content) = opt(nom::bytes::complete::escaped_transform(
            is_not(stop),
            '\\',
            alt((
                value("\\", char('\\')),
                value("\"", char('"')),
                value("'", char('\'')),
                value("\n", char('n')),
                value("\t", char('t')),
            )),
        ))(input)?;
        let (input, _) = char(quote)(input)?;

        Ok((input, content.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn methods(chain: &Chain) -> Vec<&str> {
        chain.calls().iter().map(|c| c.method.as_str()).collect()
    }

    #[test]
    fn test_single_call() {
        let chain = parse("limit(10)").unwrap();
        assert_eq!(methods(&chain), vec!["limit"]);
        assert_eq!(chain.calls()[0].args, vec![json!(10)]);
    }

    #[test]
    fn test_full_chain() {
        let chain = parse(
            r#"select("id").where("status", "active").where("age").gte(18).order("age", "DESC").limit(5).offset(10).build()"#,
        )
        .unwrap();
        assert_eq!(
            methods(&chain),
            vec!["select", "where", "where", "gte", "order", "limit", "offset", "build"]
        );
        assert_eq!(chain.calls()[1].args, vec![json!("status"), json!("active")]);
    }

    #[test]
    fn test_whitespace_and_newlines() {
        let chain = parse("builder()\n  .select( 'a' , 'b' )\n  .limit( 1 ) ;").unwrap();
        assert_eq!(methods(&chain), vec!["builder", "select", "limit"]);
        assert_eq!(chain.calls()[1].args, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_literals() {
        let chain = parse(r#"f(true, false, null, -1.5, 2e3, 0, "")"#).unwrap();
        assert_eq!(
            chain.calls()[0].args,
            vec![json!(true), json!(false), json!(null), json!(-1.5), json!(2000.0), json!(0), json!("")]
        );
    }

    #[test]
    fn test_string_escapes() {
        let chain = parse(r#"like("50\% \"off\"", 'it\'s')"#);
        // `\%` is not a known escape
        assert!(chain.is_err());

        let chain = parse(r#"like("say \"hi\"\n", 'it\'s')"#).unwrap();
        assert_eq!(chain.calls()[0].args, vec![json!("say \"hi\"\n"), json!("it's")]);
    }

    #[test]
    fn test_nested_arrays_and_objects() {
        let chain = parse(r#"where({ age: { $gt: 5 }, "tags": ["a", ["b"]], }).in([1, 2,])"#).unwrap();
        assert_eq!(
            chain.calls()[0].args,
            vec![json!({ "age": { "$gt": 5 }, "tags": ["a", ["b"]] })]
        );
        assert_eq!(chain.calls()[1].args, vec![json!([1, 2])]);
    }

    #[test]
    fn test_empty_args() {
        let chain = parse("select().build()").unwrap();
        assert!(chain.calls()[0].args.is_empty());
    }

    #[test]
    fn test_trailing_content_error() {
        let err = parse("limit(1) extra").unwrap_err();
        match err {
            QueryError::Parse { position, .. } => assert_eq!(position, 9),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_paren_error() {
        assert!(matches!(parse("limit(1"), Err(QueryError::Parse { .. })));
        assert!(matches!(parse(""), Err(QueryError::Parse { .. })));
        assert!(matches!(parse(".limit(1)"), Err(QueryError::Parse { .. })));
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(parse("limit(007)"), Err(QueryError::Parse { .. })));
    }
}
