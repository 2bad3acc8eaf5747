//! # colloquy-query
//!
//! The vocabulary shared between the natural-language translator and whatever
//! renders its output: a read-only [`Schema`] of entities and attributes tagged
//! with [`SemanticCategory`]s, and the [`StructuredQuery`] value the translator
//! builds against it.
//!
//! ```
//! use colloquy_query::{Attribute, Entity, Schema, StructuredQuery};
//!
//! let schema = Schema::new(vec![
//!     Entity::new("City")
//!         .with_primary_key("ID")
//!         .with_present("NAME")
//!         .with_attribute(Attribute::scalar("ID"))
//!         .with_attribute(Attribute::scalar("NAME")),
//! ])
//! .unwrap();
//!
//! let query = StructuredQuery::new(schema.entity("City").unwrap());
//! assert_eq!(query.to_string(), "FROM City root");
//! ```

pub mod error;
pub mod query;
pub mod schema;

pub use error::{SchemaError, SchemaResult};
pub use query::{
    Direction, Link, LinkField, OrderSpec, Predicate, ROOT_ALIAS, StructuredQuery, Value,
    WhereClause,
};
pub use schema::{Attribute, AttributeKind, Entity, Schema, SemanticCategory};
