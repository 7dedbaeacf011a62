use serde_json::{Map, Value};

use crate::rules::RuleSet;
use crate::violation::ViolationList;

/// A validation engine.
///
/// Implementations evaluate `rules` against `data` and return every
/// violation found. Returning an empty list means the data is valid.
/// Closures with the same signature implement this trait, which is handy
/// for adapting an existing engine.
///
/// # Examples
///
/// ```
/// use form_request::{RuleSet, Validator, ViolationList};
/// use serde_json::{Map, Value};
///
/// let always_fails = |_: &Map<String, Value>, _: &RuleSet| {
///     let mut violations = ViolationList::new();
///     violations.add("[token]", "Invalid CSRF token.");
///     violations
/// };
///
/// let violations = always_fails.validate(&Map::new(), &RuleSet::new());
/// assert_eq!(violations.len(), 1);
/// ```
pub trait Validator {
    /// Validates `data` against `rules`.
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ViolationList;
}

impl<F> Validator for F
where
    F: Fn(&Map<String, Value>, &RuleSet) -> ViolationList,
{
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ViolationList {
        self(data, rules)
    }
}

/// The built-in validation engine.
///
/// Violation paths use bracket notation: `[name]` for a top-level field,
/// `[address][city]` for a nested one.
///
/// # Rules
///
/// - A missing required field yields `This field is missing.`
/// - A missing optional field is skipped
/// - Every constraint of a present field is checked, in order
/// - Nested rule sets apply to objects, and to arrays by index; `null` is
///   skipped and any other value yields a type violation
/// - Undeclared fields yield `This field was not expected.` when the rule
///   set denies extra fields
///
/// # Examples
///
/// ```
/// use form_request::{Constraint, RuleSet, RuleValidator, Validator};
/// use serde_json::json;
///
/// let rules = RuleSet::new().field("name", [Constraint::NotBlank]);
/// let data = json!({"name": ""});
///
/// let violations = RuleValidator.validate(data.as_object().unwrap(), &rules);
/// assert_eq!(violations.as_slice()[0].property_path, "[name]");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    fn validate_map(
        &self,
        data: &Map<String, Value>,
        rules: &RuleSet,
        prefix: &str,
        violations: &mut ViolationList,
    ) {
        for (name, field) in rules.iter() {
            let path = format!("{}[{}]", prefix, name);

            let Some(value) = data.get(name) else {
                if field.required {
                    violations.add(path, "This field is missing.");
                }
                continue;
            };

            for constraint in &field.constraints {
                if let Err(message) = constraint.check(value) {
                    violations.add(path.clone(), message);
                }
            }

            if let Some(nested) = &field.nested {
                self.validate_nested(value, nested, &path, violations);
            }
        }

        if !rules.allows_extra_fields() {
            for key in data.keys().filter(|key| rules.get(key).is_none()) {
                violations.add(format!("{}[{}]", prefix, key), "This field was not expected.");
            }
        }
    }

    fn validate_nested(
        &self,
        value: &Value,
        rules: &RuleSet,
        path: &str,
        violations: &mut ViolationList,
    ) {
        match value {
            Value::Null => {}
            Value::Object(map) => self.validate_map(map, rules, path, violations),
            Value::Array(items) => {
                let indexed: Map<String, Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect();
                self.validate_map(&indexed, rules, path, violations);
            }
            _ => violations.add(path, "This value should be of type array."),
        }
    }
}

impl Validator for RuleValidator {
    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ViolationList {
        let mut violations = ViolationList::new();
        if !rules.is_empty() || !rules.allows_extra_fields() {
            self.validate_map(data, rules, "", &mut violations);
        }
        tracing::trace!(
            fields = rules.len(),
            violations = violations.len(),
            "rule validation finished"
        );
        violations
    }
}
