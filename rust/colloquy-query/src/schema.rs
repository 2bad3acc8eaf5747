//! Read-only schema model: entities, attributes and their meaning tags.
//!
//! The schema is a fact base the translator consults but never writes. It is
//! usually loaded once from JSON and shared behind an `Arc` by every
//! conversation that talks about it.
//!
//! ```json
//! {
//!   "entities": [{
//!     "name": "Company",
//!     "caption": ["company, firm"],
//!     "categories": ["Organization"],
//!     "primary_key": ["ID"],
//!     "present": "NAME",
//!     "attributes": [
//!       { "name": "ID" },
//!       { "name": "NAME", "categories": ["ObjectName"] },
//!       { "name": "PLACEKEY", "categories": ["ObjectLocation"],
//!         "kind": { "type": "link", "target": "City" } }
//!     ]
//!   }]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// A coarse meaning tag shared by schema elements and word senses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticCategory(String);

impl SemanticCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SemanticCategory {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an attribute holds a plain value or references another entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    #[default]
    Scalar,
    /// A reference to a row of `target`; filtering on it requires a join.
    Link { target: String },
}

/// A single attribute of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Physical attribute name, conventionally upper-cased (e.g. `NAME`).
    pub name: String,
    /// Localized display names. Each entry may list synonyms separated by `,`.
    #[serde(default)]
    pub caption: Vec<String>,
    #[serde(default)]
    pub categories: Vec<SemanticCategory>,
    #[serde(default)]
    pub kind: AttributeKind,
    /// Whether the attribute is part of the default presentation.
    #[serde(default)]
    pub visible: bool,
}

impl Attribute {
    /// Create a scalar attribute with no captions or categories.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: Vec::new(),
            categories: Vec::new(),
            kind: AttributeKind::Scalar,
            visible: false,
        }
    }

    /// Create a link attribute referencing `target`.
    pub fn link(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: AttributeKind::Link {
                target: target.into(),
            },
            ..Self::scalar(name)
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption.push(caption.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<SemanticCategory>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn visible(mut self) -> Self {
        self.visible = true;
        self
    }

    /// The entity this attribute links to, if it is a link attribute.
    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            AttributeKind::Link { target } => Some(target),
            AttributeKind::Scalar => None,
        }
    }

    pub fn is_link(&self) -> bool {
        self.link_target().is_some()
    }

    pub fn has_category(&self, category: &SemanticCategory) -> bool {
        self.categories.contains(category)
    }
}

/// An entity (table, class) of the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub caption: Vec<String>,
    #[serde(default)]
    pub categories: Vec<SemanticCategory>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// The attribute that identifies a row to a human.
    #[serde(default)]
    pub present: Option<String>,
    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: Vec::new(),
            categories: Vec::new(),
            primary_key: Vec::new(),
            present: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption.push(caption.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<SemanticCategory>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_primary_key(mut self, attribute: impl Into<String>) -> Self {
        self.primary_key.push(attribute.into());
        self
    }

    pub fn with_present(mut self, attribute: impl Into<String>) -> Self {
        self.present = Some(attribute.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Look up an attribute by its exact name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> + Clone {
        self.attributes.iter()
    }

    /// The first attribute, in declaration order, tagged with `category`.
    pub fn attribute_by_category(&self, category: &SemanticCategory) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.has_category(category))
    }

    /// The display attribute: `present` if declared, else the first key attribute.
    pub fn present_attribute(&self) -> Option<&Attribute> {
        self.present
            .as_deref()
            .or_else(|| self.primary_key.first().map(String::as_str))
            .and_then(|name| self.attribute(name))
    }

    /// Attribute names shown when nothing else was asked for: the primary
    /// key, then the present attribute, then every other visible scalar.
    pub fn default_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        };
        for key in &self.primary_key {
            push(key);
        }
        if let Some(present) = &self.present {
            push(present);
        }
        for attribute in &self.attributes {
            if attribute.visible && !attribute.is_link() {
                push(&attribute.name);
            }
        }
        fields
    }
}

/// The whole schema: entities in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    entities: Vec<Entity>,
}

impl Schema {
    /// Build a schema from entities, validating cross references.
    pub fn new(entities: Vec<Entity>) -> SchemaResult<Self> {
        let schema = Self { entities };
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a schema from its JSON form.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        tracing::debug!(entities = schema.entities.len(), "schema loaded");
        Ok(schema)
    }

    /// Look up an entity by its exact name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + Clone {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn validate(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(SchemaError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }

            let mut attributes = HashSet::new();
            for attribute in &entity.attributes {
                if !attributes.insert(attribute.name.as_str()) {
                    return Err(SchemaError::DuplicateAttribute {
                        entity: entity.name.clone(),
                        attribute: attribute.name.clone(),
                    });
                }
            }

            for key in entity.primary_key.iter().chain(entity.present.iter()) {
                if !attributes.contains(key.as_str()) {
                    return Err(SchemaError::UnknownKeyAttribute {
                        entity: entity.name.clone(),
                        attribute: key.clone(),
                    });
                }
            }
        }

        for entity in &self.entities {
            for attribute in &entity.attributes {
                if let Some(target) = attribute.link_target()
                    && self.entity(target).is_none()
                {
                    return Err(SchemaError::UnknownLinkTarget {
                        entity: entity.name.clone(),
                        attribute: attribute.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn company() -> Entity {
        Entity::new("Company")
            .with_category("Organization")
            .with_primary_key("ID")
            .with_present("NAME")
            .with_attribute(Attribute::scalar("ID"))
            .with_attribute(Attribute::scalar("NAME").with_category("ObjectName"))
            .with_attribute(Attribute::scalar("PHONE").visible())
            .with_attribute(Attribute::link("PLACEKEY", "City").visible())
    }

    fn city() -> Entity {
        Entity::new("City")
            .with_primary_key("ID")
            .with_present("NAME")
            .with_attribute(Attribute::scalar("ID"))
            .with_attribute(Attribute::scalar("NAME"))
    }

    #[test]
    fn default_fields_put_keys_first_and_skip_links() {
        assert_eq!(company().default_fields(), vec!["ID", "NAME", "PHONE"]);
    }

    #[test]
    fn present_attribute_falls_back_to_key() {
        let entity = Entity::new("Tag")
            .with_primary_key("CODE")
            .with_attribute(Attribute::scalar("CODE"));
        assert_eq!(entity.present_attribute().map(|a| a.name.as_str()), Some("CODE"));
    }

    #[test]
    fn attribute_by_category_uses_declaration_order() {
        let entity = Entity::new("Person")
            .with_attribute(Attribute::scalar("FIRST").with_category("ObjectName"))
            .with_attribute(Attribute::scalar("LAST").with_category("ObjectName"));
        let found = entity.attribute_by_category(&"ObjectName".into()).unwrap();
        assert_eq!(found.name, "FIRST");
    }

    #[test]
    fn rejects_dangling_link() {
        let result = Schema::new(vec![company()]);
        assert_eq!(
            result,
            Err(SchemaError::UnknownLinkTarget {
                entity: "Company".into(),
                attribute: "PLACEKEY".into(),
                target: "City".into(),
            })
        );
    }

    #[test]
    fn rejects_duplicate_entity() {
        let result = Schema::new(vec![city(), city()]);
        assert!(matches!(result, Err(SchemaError::DuplicateEntity { .. })));
    }

    #[test]
    fn rejects_missing_present_attribute() {
        let entity = Entity::new("Broken").with_present("NAME");
        let result = Schema::new(vec![entity]);
        assert!(matches!(result, Err(SchemaError::UnknownKeyAttribute { .. })));
    }

    #[test]
    fn loads_from_json() -> TestResult {
        let schema = Schema::from_json(
            r#"{
                "entities": [
                    { "name": "City", "primary_key": ["ID"], "present": "NAME",
                      "attributes": [{ "name": "ID" }, { "name": "NAME" }] },
                    { "name": "Company", "categories": ["Organization"],
                      "attributes": [
                        { "name": "PLACEKEY", "kind": { "type": "link", "target": "City" } }
                      ] }
                ]
            }"#,
        )?;

        assert_eq!(schema.len(), 2);
        let link = schema
            .entity("Company")
            .and_then(|e| e.attribute("PLACEKEY"))
            .ok_or("missing PLACEKEY")?;
        assert_eq!(link.link_target(), Some("City"));
        Ok(())
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = Schema::from_json(r#"{ "entities": [{ "caption": ["nameless"] }] }"#);
        assert!(matches!(result, Err(SchemaError::Malformed { .. })));
    }
}
