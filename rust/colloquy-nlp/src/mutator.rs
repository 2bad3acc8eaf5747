//! Query mutator: applies one translation rule to one matched phrase.
//!
//! A `New` rule starts a command: it picks the action, locates the target
//! entity and builds a fresh [`StructuredQuery`] presenting that entity's
//! default fields. Amending rules (`ExistingQuery`, `ExistingOrder`) edit a
//! copy of the current query:
//!
//! - **where** specs find the root attribute tagged with the spec's category
//!   and compare it with the value at the spec's path. A link attribute is
//!   joined once per query and compared through the joined entity's display
//!   attribute. Coordinated values ("Minsk, Pinsk") become one `Or` group.
//! - **order** rules clear the order, append attribute keys, or set a
//!   direction. A direction with nothing to sort yet is kept as a forward hint
//!   for a later sentence.
//!
//! Both branches then walk the complements of the phrase that was matched,
//! so "show companies located in Minsk" starts the command *and* filters it.
//! A `New` rule also walks the phrase that owns the located noun, and drops
//! any forward hint left over from the previous command.

use std::ptr;

use colloquy_query::{
    Attribute, Direction, Entity, OrderSpec, Predicate, StructuredQuery, Value, WhereClause,
};

use crate::command::{Action, Command};
use crate::error::{TranslateError, TranslateResult};
use crate::morphology::Morphology;
use crate::path::Path;
use crate::phrase::{NodeRef, Phrase, TokenKind};
use crate::resolver::SemanticResolver;
use crate::state::{ForwardHints, TranslatorState};
use crate::template::{
    ActionSelector, Context, EntityLocator, OrderRule, TemplateRegistry, TemplateRule, WhereSpec,
};

/// The command and hints being built up by one `apply`.
struct Draft {
    command: Option<Command>,
    hints: ForwardHints,
    /// A pending direction once consumed, for every later key in the sentence.
    consumed_direction: Option<Direction>,
}

impl Draft {
    fn current(&mut self, phrase: &Phrase) -> TranslateResult<&mut Command> {
        self.command.as_mut().ok_or_else(|| TranslateError::NoContext {
            operation: phrase.template.to_string(),
        })
    }
}

/// Interprets template rules against phrase trees.
pub struct QueryMutator<'a, M> {
    registry: &'a TemplateRegistry,
    morphology: &'a M,
}

impl<'a, M: Morphology> QueryMutator<'a, M> {
    pub fn new(registry: &'a TemplateRegistry, morphology: &'a M) -> Self {
        Self {
            registry,
            morphology,
        }
    }

    /// Apply `rule` to `tree`, returning the successor of `state`.
    ///
    /// On error `state` is untouched and no partial command escapes.
    pub fn apply(
        &self,
        state: &TranslatorState,
        tree: &Phrase,
        rule: &TemplateRule,
        utterance: Option<&str>,
    ) -> TranslateResult<TranslatorState> {
        let resolver = SemanticResolver::new(state.schema(), self.morphology);
        let mut draft = Draft {
            command: state.command().cloned(),
            hints: state.hints(),
            consumed_direction: None,
        };

        match rule.context {
            Context::New => self.start(&resolver, &mut draft, tree, rule)?,
            Context::ExistingQuery | Context::ExistingOrder => {
                self.amend(&resolver, &mut draft, tree, rule)?
            }
        }

        if let Some(text) = utterance
            && let Some(command) = draft.command.as_mut()
        {
            command.utterances.push(text.to_string());
        }

        tracing::debug!(template = %tree.template, context = ?rule.context, "rule applied");
        Ok(state.evolve(draft.command, draft.hints))
    }

    fn start(
        &self,
        resolver: &SemanticResolver<'_, M>,
        draft: &mut Draft,
        tree: &Phrase,
        rule: &TemplateRule,
    ) -> TranslateResult<()> {
        let action = select_action(tree, &rule.actions)?;
        let (entity, parent) = locate_entity(resolver, tree, rule)?;

        let mut query = StructuredQuery::new(entity);
        if let Some(path) = &rule.limit {
            query.limit = limit(tree, path)?;
        }
        tracing::debug!(%action, entity = %entity.name, "command started");
        draft.command = Some(Command::new(action, query));
        // Hints were said against the previous command.
        draft.hints = ForwardHints::default();

        let owner = parent.filter(|parent| !ptr::eq(*parent, tree));
        if let Some(owner) = owner {
            self.complements(resolver, draft, &owner.complements)?;
        }
        self.complements(
            resolver,
            draft,
            tree.complements
                .iter()
                .filter(|complement| owner.is_none_or(|owner| !ptr::eq(*complement, owner))),
        )
    }

    fn amend(
        &self,
        resolver: &SemanticResolver<'_, M>,
        draft: &mut Draft,
        tree: &Phrase,
        rule: &TemplateRule,
    ) -> TranslateResult<()> {
        // Fails early even for rules with nothing to apply.
        draft.current(tree)?;

        for spec in &rule.filter {
            let command = draft.current(tree)?;
            let clause = build_filter(resolver, &mut command.query, tree, spec)?;
            tracing::debug!(%clause, "filter added");
            command.query.filter.push(clause);
        }

        for order in &rule.order {
            self.amend_order(resolver, draft, tree, order)?;
        }

        self.complements(resolver, draft, &tree.complements)
    }

    /// Amend with every complement whose rule amends.
    fn complements<'p>(
        &self,
        resolver: &SemanticResolver<'_, M>,
        draft: &mut Draft,
        complements: impl IntoIterator<Item = &'p Phrase>,
    ) -> TranslateResult<()> {
        for complement in complements {
            match self.registry.rule(complement.template.as_str()) {
                Some(rule) if rule.context != Context::New => {
                    self.amend(resolver, draft, complement, rule)?
                }
                Some(_) => tracing::trace!(
                    template = %complement.template,
                    "skipping complement that starts a command"
                ),
                None => tracing::trace!(
                    template = %complement.template,
                    "skipping complement without a rule"
                ),
            }
        }
        Ok(())
    }

    fn amend_order(
        &self,
        resolver: &SemanticResolver<'_, M>,
        draft: &mut Draft,
        tree: &Phrase,
        order: &OrderRule,
    ) -> TranslateResult<()> {
        match order {
            OrderRule::Clear => {
                draft.current(tree)?.query.order.clear();
            }
            OrderRule::ByAttribute(path) => {
                let direction = match draft.hints.pending_sort_direction.take() {
                    Some(direction) => {
                        tracing::debug!(%direction, "consumed pending sort direction");
                        draft.consumed_direction = Some(direction);
                        direction
                    }
                    None => draft.consumed_direction.unwrap_or(Direction::Asc),
                };
                let query = &mut draft.current(tree)?.query;
                let terms = path
                    .find(tree)
                    .map(NodeRef::terms)
                    .filter(|terms| !terms.is_empty())
                    .ok_or_else(|| invalid(path))?;
                let entity = root_entity(resolver, query)?;
                let alias = query.root_alias().to_string();
                for term in terms {
                    let attribute = resolver
                        .resolve_attribute_node(entity, term)
                        .ok_or_else(|| TranslateError::UnknownAttr {
                            noun: term.to_string(),
                        })?;
                    query.order.push(OrderSpec {
                        alias: alias.clone(),
                        attribute: attribute.name.clone(),
                        direction,
                    });
                }
            }
            OrderRule::Direction(path) => {
                let direction = path
                    .find(tree)
                    .and_then(|node| self.direction(node))
                    .ok_or_else(|| invalid(path))?;
                let follows_key = tree
                    .prev_sibling
                    .as_ref()
                    .and_then(|sibling| self.registry.rule(sibling.as_str()))
                    .is_some_and(TemplateRule::orders_by_attribute);

                let query = &mut draft.current(tree)?.query;
                if query.order.is_empty() {
                    tracing::debug!(%direction, "stored pending sort direction");
                    draft.hints.pending_sort_direction = Some(direction);
                } else if follows_key {
                    if let Some(last) = query.order.last_mut() {
                        last.direction = direction;
                    }
                } else {
                    for spec in &mut query.order {
                        spec.direction = direction;
                    }
                }
            }
        }
        Ok(())
    }

    fn direction(&self, node: NodeRef<'_>) -> Option<Direction> {
        match node {
            NodeRef::Word(word) => self
                .registry
                .direction(&word.lemma)
                .or_else(|| self.registry.direction(&word.surface)),
            NodeRef::Token(token) => self.registry.direction(token.value()),
            NodeRef::Phrase(_) | NodeRef::Empty => None,
        }
    }
}

fn invalid(path: &Path) -> TranslateError {
    TranslateError::InvalidPhraseStructure {
        path: path.to_string(),
    }
}

fn select_action(tree: &Phrase, selectors: &[ActionSelector]) -> TranslateResult<Action> {
    selectors
        .iter()
        .find(|selector| match &selector.when {
            None => true,
            Some(condition) => condition
                .path
                .find(tree)
                .and_then(written_as)
                .is_some_and(|written| written.eq_ignore_ascii_case(&condition.word)),
        })
        .map(|selector| selector.action)
        .ok_or_else(|| TranslateError::UnknownAction {
            template: tree.template.to_string(),
        })
}

/// How a word or token was written in the sentence.
fn written_as(node: NodeRef<'_>) -> Option<&str> {
    match node {
        NodeRef::Word(word) => Some(&word.surface),
        NodeRef::Token(token) => Some(&token.text),
        NodeRef::Phrase(_) | NodeRef::Empty => None,
    }
}

/// The target entity and, for path locators, the phrase owning the noun.
fn locate_entity<'s, 't, M: Morphology>(
    resolver: &SemanticResolver<'s, M>,
    tree: &'t Phrase,
    rule: &TemplateRule,
) -> TranslateResult<(&'s Entity, Option<&'t Phrase>)> {
    match &rule.entity {
        Some(EntityLocator::Class(name)) => resolver
            .schema()
            .entity(name)
            .map(|entity| (entity, None))
            .ok_or_else(|| TranslateError::UnknownEntity { noun: name.clone() }),
        Some(EntityLocator::Path(path)) => {
            let (parent, node) = path.find_with_parent(tree).ok_or_else(|| invalid(path))?;
            resolver
                .resolve_entity_node(node)
                .map(|entity| (entity, Some(parent)))
                .ok_or_else(|| TranslateError::UnknownEntity {
                    noun: node.to_string(),
                })
        }
        None => Err(TranslateError::UnknownEntity {
            noun: tree.template.to_string(),
        }),
    }
}

fn limit(tree: &Phrase, path: &Path) -> TranslateResult<Option<u64>> {
    let Some(node) = path.find(tree) else {
        return Ok(None);
    };
    let digits = match node {
        NodeRef::Token(token) if token.kind == TokenKind::Numeral => token.text.as_str(),
        NodeRef::Word(word) => word.lemma.as_str(),
        _ => return Err(invalid(path)),
    };
    digits.parse().map(Some).map_err(|_| invalid(path))
}

fn root_entity<'s, M: Morphology>(
    resolver: &SemanticResolver<'s, M>,
    query: &StructuredQuery,
) -> TranslateResult<&'s Entity> {
    resolver
        .schema()
        .entity(query.root_entity())
        .ok_or_else(|| TranslateError::UnknownEntity {
            noun: query.root_entity().to_string(),
        })
}

/// Build the clause for one where spec, joining through link attributes.
fn build_filter<M: Morphology>(
    resolver: &SemanticResolver<'_, M>,
    query: &mut StructuredQuery,
    tree: &Phrase,
    spec: &WhereSpec,
) -> TranslateResult<WhereClause> {
    let entity = root_entity(resolver, query)?;
    let attribute = entity
        .attribute_by_category(&spec.category)
        .ok_or_else(|| TranslateError::UnknownAttr {
            noun: spec.category.to_string(),
        })?;

    let node = spec.path.find(tree).ok_or_else(|| invalid(&spec.path))?;
    let values = node
        .terms()
        .into_iter()
        .map(value_of)
        .collect::<Option<Vec<_>>>()
        .filter(|values| !values.is_empty())
        .ok_or_else(|| invalid(&spec.path))?;

    let (alias, column) = target(resolver, query, attribute)?;
    let mut clauses: Vec<WhereClause> = values
        .into_iter()
        .map(|value| spec.predicate.clause(Predicate::new(alias.clone(), column.clone(), value)))
        .collect();

    let clause = if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        WhereClause::Or { clauses }
    };
    Ok(if spec.negate { clause.negate() } else { clause })
}

/// The alias and attribute a predicate on `attribute` compares against.
fn target<M: Morphology>(
    resolver: &SemanticResolver<'_, M>,
    query: &mut StructuredQuery,
    attribute: &Attribute,
) -> TranslateResult<(String, String)> {
    let Some(target) = attribute.link_target() else {
        return Ok((query.root_alias().to_string(), attribute.name.clone()));
    };
    let linked = resolver
        .schema()
        .entity(target)
        .ok_or_else(|| TranslateError::UnknownEntity {
            noun: target.to_string(),
        })?;
    let display = linked
        .present_attribute()
        .ok_or_else(|| TranslateError::UnknownAttr {
            noun: linked.name.clone(),
        })?;
    let alias = query.join(attribute, linked);
    Ok((alias, display.name.clone()))
}

fn value_of(term: NodeRef<'_>) -> Option<Value> {
    match term {
        NodeRef::Word(word) => Some(Value::from(word.lemma.as_str())),
        NodeRef::Token(token) if token.kind == TokenKind::Numeral => Some(
            token
                .text
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::from(token.text.as_str())),
        ),
        NodeRef::Token(token) => Some(Value::from(token.value())),
        NodeRef::Phrase(_) | NodeRef::Empty => None,
    }
}
