//! Template registry: declarative translation rules keyed by phrase template.
//!
//! A rule says nothing about *how* it is applied. It names a [`Context`] and
//! the paths at which the pieces it needs can be found; the
//! [`crate::mutator::QueryMutator`] interprets it against a concrete tree.
//!
//! Registries are usually loaded from JSON. Templates keep the order they
//! are declared in, and that order is the order the driver tries them in:
//!
//! ```
//! use colloquy_nlp::template::{Context, TemplateRegistry};
//!
//! let registry = TemplateRegistry::from_json(r#"{
//!     "directions": { "descending": "desc" },
//!     "templates": {
//!         "vpShow": {
//!             "context": "new",
//!             "actions": [{ "action": "query" }],
//!             "entity": { "path": "H/npObject/H" }
//!         },
//!         "ppPlace": {
//!             "context": "existing_query",
//!             "where": [{ "category": "ObjectLocation", "path": "H/1" }]
//!         }
//!     }
//! }"#).unwrap();
//!
//! let ids: Vec<&str> = registry.templates().map(|t| t.as_str()).collect();
//! assert_eq!(ids, vec!["vpShow", "ppPlace"]);
//! assert_eq!(registry.rule("ppPlace").map(|r| r.context), Some(Context::ExistingQuery));
//! ```

use colloquy_query::{Direction, Predicate, SemanticCategory, WhereClause};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::command::Action;
use crate::config::ConfigError;
use crate::path::Path;
use crate::phrase::TemplateId;

/// Whether a rule starts a command or amends the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    New,
    ExistingQuery,
    ExistingOrder,
}

/// Picks the action of a new command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSelector {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl ActionSelector {
    pub fn always(action: Action) -> Self {
        Self { action, when: None }
    }

    pub fn when(action: Action, path: Path, word: impl Into<String>) -> Self {
        Self {
            action,
            when: Some(Condition {
                path,
                word: word.into(),
            }),
        }
    }
}

/// Holds when the node at `path` is written as `word`, ignoring case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub path: Path,
    pub word: String,
}

/// Where the target entity of a new command comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLocator {
    /// An entity named directly.
    Class(String),
    /// A noun in the tree, resolved semantically.
    Path(Path),
}

/// How a filter value is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    #[default]
    Equals,
    Contains,
}

impl PredicateKind {
    pub fn clause(self, predicate: Predicate) -> WhereClause {
        match self {
            PredicateKind::Equals => WhereClause::Equals(predicate),
            PredicateKind::Contains => WhereClause::Contains(predicate),
        }
    }
}

/// A filter to add: the attribute tagged `category`, compared with the value
/// found at `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereSpec {
    pub category: SemanticCategory,
    pub path: Path,
    #[serde(default)]
    pub predicate: PredicateKind,
    #[serde(default)]
    pub negate: bool,
}

impl WhereSpec {
    pub fn new(category: impl Into<SemanticCategory>, path: Path) -> Self {
        Self {
            category: category.into(),
            path,
            predicate: PredicateKind::Equals,
            negate: false,
        }
    }

    pub fn contains(mut self) -> Self {
        self.predicate = PredicateKind::Contains;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

/// A change to the sort order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderRule {
    /// Drop the current order.
    Clear,
    /// Sort by the attributes named at the path.
    #[serde(rename = "attribute")]
    ByAttribute(Path),
    /// Set the direction named at the path.
    Direction(Path),
}

/// The translation rule of one phrase template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRule {
    pub context: Context,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityLocator>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<WhereSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderRule>,
    /// Path to a numeral capping the number of rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Path>,
}

impl TemplateRule {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            actions: Vec::new(),
            entity: None,
            filter: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn action(mut self, selector: ActionSelector) -> Self {
        self.actions.push(selector);
        self
    }

    pub fn entity(mut self, locator: EntityLocator) -> Self {
        self.entity = Some(locator);
        self
    }

    pub fn filter(mut self, spec: WhereSpec) -> Self {
        self.filter.push(spec);
        self
    }

    pub fn order(mut self, rule: OrderRule) -> Self {
        self.order.push(rule);
        self
    }

    pub fn limit(mut self, path: Path) -> Self {
        self.limit = Some(path);
        self
    }

    /// Whether the rule sorts by an attribute.
    pub fn orders_by_attribute(&self) -> bool {
        self.order
            .iter()
            .any(|rule| matches!(rule, OrderRule::ByAttribute(_)))
    }

    fn validate(&self, template: &TemplateId) -> Result<(), ConfigError> {
        if self.context != Context::New {
            return Ok(());
        }
        if self.actions.is_empty() {
            return Err(ConfigError::MissingActions {
                template: template.to_string(),
            });
        }
        if self.entity.is_none() {
            return Err(ConfigError::MissingEntity {
                template: template.to_string(),
            });
        }
        Ok(())
    }
}

/// Every known template with its rule, plus the direction vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRegistry {
    #[serde(default)]
    templates: IndexMap<TemplateId, TemplateRule>,
    /// Direction words, lowercased.
    #[serde(default)]
    directions: IndexMap<String, Direction>,
}

impl TemplateRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load a registry from JSON, validating every rule.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut registry: TemplateRegistry = serde_json::from_str(json)?;
        registry.directions = registry
            .directions
            .into_iter()
            .map(|(word, direction)| (word.to_lowercase(), direction))
            .collect();
        registry.validate()?;
        tracing::debug!(templates = registry.templates.len(), "template registry loaded");
        Ok(registry)
    }

    pub fn rule(&self, template: &str) -> Option<&TemplateRule> {
        self.templates.get(template)
    }

    /// Template ids in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateId> {
        self.templates.keys()
    }

    pub fn direction(&self, word: &str) -> Option<Direction> {
        self.directions.get(&word.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.templates
            .iter()
            .try_for_each(|(id, rule)| rule.validate(id))
    }
}

/// Builder for registries assembled in code.
#[derive(Default)]
pub struct RegistryBuilder {
    templates: IndexMap<TemplateId, TemplateRule>,
    directions: IndexMap<String, Direction>,
}

impl RegistryBuilder {
    pub fn rule(mut self, template: impl Into<TemplateId>, rule: TemplateRule) -> Self {
        self.templates.insert(template.into(), rule);
        self
    }

    pub fn direction(mut self, word: &str, direction: Direction) -> Self {
        self.directions.insert(word.to_lowercase(), direction);
        self
    }

    /// Shorthand for the usual English direction words.
    pub fn english_directions(self) -> Self {
        self.direction("ascending", Direction::Asc)
            .direction("asc", Direction::Asc)
            .direction("descending", Direction::Desc)
            .direction("desc", Direction::Desc)
    }

    pub fn build(self) -> Result<TemplateRegistry, ConfigError> {
        let registry = TemplateRegistry {
            templates: self.templates,
            directions: self.directions,
        };
        registry.validate()?;
        Ok(registry)
    }
}
