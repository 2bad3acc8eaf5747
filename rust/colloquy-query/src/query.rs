//! Structured entity queries.
//!
//! A [`StructuredQuery`] is the value the translator produces: a root entity,
//! a join tree of [`Link`]s, filter clauses, sort order and paging. Each link
//! carries an alias that is unique within its query; filters and order specs
//! refer to attributes through those aliases.
//!
//! The textual [`fmt::Display`] form is meant for logs and diagnostics only.
//! Downstream renderers consume the serde representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Attribute, Entity};

/// Alias of the root link of every query.
pub const ROOT_ALIAS: &str = "root";

/// A scalar value a predicate compares against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// One attribute of a link, qualified by the link's alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub alias: String,
    pub attribute: String,
    pub value: Value,
}

impl Predicate {
    pub fn new(alias: impl Into<String>, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            alias: alias.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// A filter clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WhereClause {
    Contains(Predicate),
    Equals(Predicate),
    Or { clauses: Vec<WhereClause> },
    And { clauses: Vec<WhereClause> },
    Not { clause: Box<WhereClause> },
}

impl WhereClause {
    /// Wrap the clause in a negation.
    pub fn negate(self) -> Self {
        WhereClause::Not {
            clause: Box::new(self),
        }
    }

    /// Every alias this clause refers to, depth first.
    pub fn aliases(&self) -> Vec<&str> {
        match self {
            WhereClause::Contains(p) | WhereClause::Equals(p) => vec![p.alias.as_str()],
            WhereClause::Or { clauses } | WhereClause::And { clauses } => {
                clauses.iter().flat_map(|c| c.aliases()).collect()
            }
            WhereClause::Not { clause } => clause.aliases(),
        }
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(f: &mut fmt::Formatter<'_>, clauses: &[WhereClause], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{clause}")?;
            }
            write!(f, ")")
        }

        match self {
            WhereClause::Contains(p) => write!(f, "{}.{} CONTAINS {}", p.alias, p.attribute, p.value),
            WhereClause::Equals(p) => write!(f, "{}.{} = {}", p.alias, p.attribute, p.value),
            WhereClause::Or { clauses } => group(f, clauses, "OR"),
            WhereClause::And { clauses } => group(f, clauses, "AND"),
            WhereClause::Not { clause } => write!(f, "NOT {clause}"),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub alias: String,
    pub attribute: String,
    pub direction: Direction,
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.alias, self.attribute, self.direction)
    }
}

/// An attribute selected from a link, with the joins hanging off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkField {
    pub attribute: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl LinkField {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            links: Vec::new(),
        }
    }
}

/// A node of the join tree: an entity reachable under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub alias: String,
    pub entity: String,
    pub fields: Vec<LinkField>,
}

impl Link {
    /// A link selecting the entity's default presentation fields.
    pub fn presenting(alias: impl Into<String>, entity: &Entity) -> Self {
        Self {
            alias: alias.into(),
            entity: entity.name.clone(),
            fields: entity.default_fields().into_iter().map(LinkField::new).collect(),
        }
    }

    /// This link and every link below it, depth first.
    pub fn walk(&self) -> Vec<&Link> {
        let mut links = vec![self];
        for field in &self.fields {
            for link in &field.links {
                links.extend(link.walk());
            }
        }
        links
    }
}

/// A relational query over one root entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub root: Link,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<WhereClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Last alias number handed out; the root counts as the first.
    #[serde(default = "initial_alias_seq")]
    alias_seq: u32,
}

fn initial_alias_seq() -> u32 {
    1
}

impl StructuredQuery {
    /// A fresh query over `entity` presenting its default fields.
    pub fn new(entity: &Entity) -> Self {
        Self {
            root: Link::presenting(ROOT_ALIAS, entity),
            filter: Vec::new(),
            order: Vec::new(),
            limit: None,
            skip: None,
            alias_seq: initial_alias_seq(),
        }
    }

    pub fn root_entity(&self) -> &str {
        &self.root.entity
    }

    pub fn root_alias(&self) -> &str {
        &self.root.alias
    }

    /// Every link alias in the join tree, the root first.
    pub fn aliases(&self) -> Vec<&str> {
        self.root.walk().into_iter().map(|l| l.alias.as_str()).collect()
    }

    /// Find a link anywhere in the join tree by alias.
    pub fn link(&self, alias: &str) -> Option<&Link> {
        self.root.walk().into_iter().find(|l| l.alias == alias)
    }

    /// The link already joined from the root through `attribute`, if any.
    pub fn joined(&self, attribute: &str) -> Option<&Link> {
        self.root
            .fields
            .iter()
            .find(|f| f.attribute == attribute)
            .and_then(|f| f.links.first())
    }

    /// Join `target` from the root through the link attribute `attribute`,
    /// reusing an existing join for the same attribute. Returns the alias of
    /// the joined link.
    pub fn join(&mut self, attribute: &Attribute, target: &Entity) -> String {
        if let Some(link) = self.joined(&attribute.name) {
            tracing::trace!(alias = %link.alias, attribute = %attribute.name, "reusing join");
            return link.alias.clone();
        }

        let alias = self.mint_alias();
        tracing::debug!(%alias, attribute = %attribute.name, target = %target.name, "joining link");
        let link = Link::presenting(alias.clone(), target);

        match self.root.fields.iter_mut().find(|f| f.attribute == attribute.name) {
            Some(field) => field.links.push(link),
            None => {
                let mut field = LinkField::new(attribute.name.clone());
                field.links.push(link);
                self.root.fields.push(field);
            }
        }
        alias
    }

    /// Hand out the next alias not yet used in this query.
    fn mint_alias(&mut self) -> String {
        loop {
            self.alias_seq += 1;
            let alias = format!("alias{}", self.alias_seq);
            if self.link(&alias).is_none() {
                return alias;
            }
        }
    }
}

impl fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {} {}", self.root.entity, self.root.alias)?;
        for link in self.root.walk().into_iter().skip(1) {
            write!(f, " JOIN {} {}", link.entity, link.alias)?;
        }
        if !self.filter.is_empty() {
            write!(f, " WHERE ")?;
            for (i, clause) in self.filter.iter().enumerate() {
                if i > 0 {
                    write!(f, " AND ")?;
                }
                write!(f, "{clause}")?;
            }
        }
        if !self.order.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, order) in self.order.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{order}")?;
            }
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(skip) = self.skip {
            write!(f, " SKIP {skip}")?;
        }
        Ok(())
    }
}
