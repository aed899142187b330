//! # findopts
//!
//! A fluent builder for ORM find-options documents.
//!
//! Chain calls to accumulate selected fields, filters, ordering and
//! pagination, then [`build`](builder::QueryBuilder::build) a plain
//! document a Sequelize-style `find` call accepts.
//!
//! ## Quick Example
//!
//! ```
//! use findopts::prelude::*;
//!
//! let opts = findopts::builder()
//!     .select(["id", "email"])
//!     .where_eq("status", "active")
//!     .where_field("age").gte(18)
//!     .order("created_at DESC")
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(
//!     opts.to_json().unwrap(),
//!     r#"{"attributes":["id","email"],"where":{"age":{"$gte":18},"status":{"$eq":"active"}},"order":["created_at DESC"],"limit":10}"#
//! );
//! ```
//!
//! ## Operators
//!
//! | Method       | Marker        | Method        | Marker         |
//! |--------------|---------------|---------------|----------------|
//! | `eq`         | `$eq`         | `is_in`       | `$in`          |
//! | `ne`         | `$ne`         | `not_in`      | `$notIn`       |
//! | `gt` / `gte` | `$gt`/`$gte`  | `between`     | `$between`     |
//! | `lt` / `lte` | `$lt`/`$lte`  | `not_between` | `$notBetween`  |
//! | `is` / `not` | `$is`/`$not`  | `overlap`     | `$overlap`     |
//! | `like`       | `$like`       | `contains`    | `$contains`    |
//! | `not_like`   | `$notLike`    | `contained`   | `$contained`   |
//! | `ilike`      | `$iLike`      |               |                |
//! | `not_ilike`  | `$notILike`   |               |                |

pub mod builder;
pub mod chain;
pub mod config;
pub mod error;
pub mod operators;
pub mod options;
pub mod parser;

pub mod prelude {
    pub use crate::builder::{QueryBuilder, Selection};
    pub use crate::chain::{Call, Chain};
    pub use crate::error::*;
    pub use crate::operators::{Operator, OperatorKind};
    pub use crate::options::{Clause, Filter, FindOptions, OrderTerm, SortOrder};
    pub use serde_json::Value;
}

/// Create an empty [`QueryBuilder`](builder::QueryBuilder).
///
/// Equivalent to `QueryBuilder::new()`.
pub fn builder() -> builder::QueryBuilder {
    builder::QueryBuilder::new()
}

/// Parse a textual builder chain.
///
/// # Example
///
/// ```
/// let chain = findopts::parse(r#"where("age").gte(18).limit(5)"#).unwrap();
/// assert_eq!(chain.calls().len(), 3);
///
/// let opts = chain.build(false).unwrap();
/// assert_eq!(opts.limit, Some(5));
/// ```
pub fn parse(input: &str) -> Result<chain::Chain, error::QueryError> {
    parser::parse(input)
}
