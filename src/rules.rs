//! Declarative rule schemas.
//!
//! A [`RuleSet`] describes the expected shape of the aggregated input:
//! which fields must or may be present, which [`Constraint`]s apply to each,
//! and nested rule sets for structured values. The facade never interprets
//! a rule set itself; it hands it to a [`Validator`](crate::Validator).

use crate::constraint::Constraint;

/// Rules attached to a single field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Whether a missing field is a violation
    pub required: bool,
    /// Constraints checked in declaration order
    pub constraints: Vec<Constraint>,
    /// Rules for the members of a structured value
    pub nested: Option<RuleSet>,
}

/// A collection of field rules.
///
/// Fields are checked in declaration order. Extra fields are allowed
/// unless [`deny_extra_fields`](RuleSet::deny_extra_fields) is called.
///
/// # Examples
///
/// ```
/// use form_request::{Constraint, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("name", [Constraint::NotBlank])
///     .optional("nickname", [Constraint::Length { min: None, max: Some(20) }])
///     .nested(
///         "address",
///         RuleSet::new().field("city", [Constraint::NotBlank]),
///     );
///
/// assert_eq!(rules.len(), 3);
/// assert!(rules.get("address").unwrap().nested.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RuleSet {
    fields: Vec<(String, FieldRules)>,
    allow_extra_fields: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            allow_extra_fields: true,
        }
    }
}

impl RuleSet {
    /// Creates an empty rule set. An empty set never produces violations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required field.
    pub fn field<C>(self, name: impl Into<String>, constraints: C) -> Self
    where
        C: IntoIterator<Item = Constraint>,
    {
        self.with(name, true, constraints, None)
    }

    /// Adds a field that may be absent. Constraints apply when it is present.
    pub fn optional<C>(self, name: impl Into<String>, constraints: C) -> Self
    where
        C: IntoIterator<Item = Constraint>,
    {
        self.with(name, false, constraints, None)
    }

    /// Adds a required structured field validated by `rules`.
    pub fn nested(self, name: impl Into<String>, rules: RuleSet) -> Self {
        self.with(name, true, Vec::new(), Some(rules))
    }

    /// Adds a fully specified field.
    ///
    /// Declaring the same name twice replaces the earlier declaration in place.
    pub fn with<C>(
        mut self,
        name: impl Into<String>,
        required: bool,
        constraints: C,
        nested: Option<RuleSet>,
    ) -> Self
    where
        C: IntoIterator<Item = Constraint>,
    {
        let name = name.into();
        let rules = FieldRules {
            required,
            constraints: constraints.into_iter().collect(),
            nested,
        };
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name, rules)),
        }
        self
    }

    /// Reports fields that have no declaration as violations.
    pub fn deny_extra_fields(mut self) -> Self {
        self.allow_extra_fields = false;
        self
    }

    /// Whether undeclared fields are accepted.
    pub fn allows_extra_fields(&self) -> bool {
        self.allow_extra_fields
    }

    /// Looks up the rules of one field.
    pub fn get(&self, name: &str) -> Option<&FieldRules> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rules)| rules)
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
