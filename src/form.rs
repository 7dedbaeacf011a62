//! The request wrapper handed to request handlers.

use serde_json::{Map, Value};

use crate::input;
use crate::logging::RequestLog;
use crate::property_path::PropertyPath;
use crate::request::{HttpMethod, RequestSource};
use crate::rules::RuleSet;
use crate::validator::{RuleValidator, Validator};
use crate::violation::{Violation, ViolationList};

static DEFAULT_VALIDATOR: RuleValidator = RuleValidator;

/// Supplies the rule schema of a form request.
///
/// Implement this for each kind of request your handlers accept. The
/// optional [`after`](RequestRules::after) hook runs after every validation
/// pass and may add violations, typically for checks that span several
/// fields.
///
/// # Examples
///
/// ```
/// use form_request::{Constraint, RequestRules, RuleSet, ViolationList};
/// use serde_json::{Map, Value};
///
/// struct ChangePassword;
///
/// impl RequestRules for ChangePassword {
///     fn rules(&self) -> RuleSet {
///         RuleSet::new()
///             .field("password", [Constraint::NotBlank])
///             .field("confirmation", [Constraint::NotBlank])
///     }
///
///     fn after(&self, input: &Map<String, Value>, violations: &mut ViolationList) {
///         if input.get("password") != input.get("confirmation") {
///             violations.add("[confirmation]", "The passwords do not match.");
///         }
///     }
/// }
/// ```
pub trait RequestRules {
    /// The rule schema used by [`FormRequest::validate`].
    fn rules(&self) -> RuleSet;

    /// Post-validation hook. Does nothing by default.
    fn after(&self, _input: &Map<String, Value>, _violations: &mut ViolationList) {}
}

/// Rules provider for requests without a schema.
///
/// Validation with `NoRules` always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RequestRules for NoRules {
    fn rules(&self) -> RuleSet {
        RuleSet::default()
    }
}

impl RequestRules for RuleSet {
    fn rules(&self) -> RuleSet {
        self.clone()
    }
}

/// Validation state of a [`FormRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// No validation pass has completed
    Unvalidated,
    /// The last pass produced no violations
    Valid,
    /// The last pass produced at least one violation
    Invalid,
}

/// A decorated HTTP request.
///
/// `FormRequest` borrows the raw request for its whole lifetime, merges its
/// inputs on demand and keeps the violations of the most recent validation
/// pass. Construction runs one pass with the rules of `R`.
///
/// The aggregated input is rebuilt on every call; nothing is cached.
///
/// # Examples
///
/// ```
/// use form_request::{Constraint, FormRequest, RawRequest, RuleSet};
/// use serde_json::json;
///
/// let raw = RawRequest::builder()
///     .query("page", json!(1))
///     .json(&json!({"name": ""}))
///     .build();
///
/// let rules = RuleSet::new().field("name", [Constraint::NotBlank]);
/// let form = FormRequest::with_default_validator(&raw, rules);
///
/// assert!(!form.is_valid());
/// assert_eq!(form.errors()["name"], json!(["This value should not be blank."]));
/// assert_eq!(form.only(["page"])["page"], json!(1));
/// ```
pub struct FormRequest<'r, R = NoRules> {
    request: &'r dyn RequestSource,
    validator: &'r dyn Validator,
    rules: R,
    violations: Option<ViolationList>,
    validated_fields: Vec<String>,
    log: RequestLog,
}

impl<'r> FormRequest<'r, NoRules> {
    /// Wraps `request` without a rule schema, using the built-in validator.
    pub fn plain(request: &'r dyn RequestSource) -> Self {
        Self::with_default_validator(request, NoRules)
    }
}

impl<'r, R: RequestRules> FormRequest<'r, R> {
    /// Wraps `request` and runs the initial validation pass.
    pub fn new(request: &'r dyn RequestSource, validator: &'r dyn Validator, rules: R) -> Self {
        let mut form = Self {
            request,
            validator,
            rules,
            violations: None,
            validated_fields: Vec::new(),
            log: RequestLog::new(request.request_id()),
        };
        form.validate();
        form
    }

    /// Like [`new`](Self::new), validating with [`RuleValidator`].
    pub fn with_default_validator(request: &'r dyn RequestSource, rules: R) -> Self {
        Self::new(request, &DEFAULT_VALIDATOR, rules)
    }

    /// All inputs merged into one map.
    ///
    /// Query parameters take precedence over body parameters, which take
    /// precedence over uploaded files. A JSON body only contributes keys
    /// that none of those sources define.
    pub fn all(&self) -> Map<String, Value> {
        input::aggregate(self.request, &self.log)
    }

    /// The inputs named by `keys`; missing keys map to `null`.
    pub fn only<I>(&self, keys: I) -> Map<String, Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        input::only(&self.all(), keys)
    }

    /// All inputs except those named by `keys`.
    pub fn except<I>(&self, keys: I) -> Map<String, Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        input::except(self.all(), keys)
    }

    /// Whether every key in `keys` is present, even with an empty value.
    pub fn has<I>(&self, keys: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        input::has(&self.all(), keys)
    }

    /// Reads one input by property path (`name`, `address.city`, `items[0]`).
    ///
    /// An unparseable path reads nothing.
    pub fn get(&self, path: &str) -> Option<Value> {
        let path = PropertyPath::parse(path).ok()?;
        path.read(&self.all()).cloned()
    }

    /// Reads one input by property path, falling back to `default`.
    pub fn input(&self, path: &str, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Whether the client accepts a JSON response.
    pub fn wants_json(&self) -> bool {
        input::wants_json(self.request)
    }

    /// Whether the request body is declared as JSON.
    pub fn is_json(&self) -> bool {
        input::is_json(self.request)
    }

    /// Validates the current input against the rules of `R`.
    pub fn validate(&mut self) -> &mut Self {
        let rules = self.rules.rules();
        self.validate_with(&rules)
    }

    /// Validates the current input against `rules`.
    ///
    /// Replaces the violations of any previous pass. The `after` hook of `R`
    /// runs once the validator returns.
    pub fn validate_with(&mut self, rules: &RuleSet) -> &mut Self {
        let input = self.all();
        let mut violations = self.validator.validate(&input, rules);
        self.rules.after(&input, &mut violations);

        self.log.debug(format_args!(
            "validated {} input keys against {} rules: {} violations",
            input.len(),
            rules.len(),
            violations.len()
        ));

        self.validated_fields = rules.field_names().map(str::to_string).collect();
        self.violations = Some(violations);
        self
    }

    /// Current validation state.
    pub fn state(&self) -> ValidationState {
        match &self.violations {
            None => ValidationState::Unvalidated,
            Some(list) if list.is_empty() => ValidationState::Valid,
            Some(_) => ValidationState::Invalid,
        }
    }

    /// `true` unless the last validation pass found violations.
    ///
    /// A request that was never validated counts as valid.
    pub fn is_valid(&self) -> bool {
        self.state() != ValidationState::Invalid
    }

    /// Violations of the last pass, in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        self.violations
            .as_ref()
            .map(ViolationList::as_slice)
            .unwrap_or_default()
    }

    /// Violation messages grouped by property path.
    ///
    /// Paths are expanded into nested maps, so `[address][city]` ends up
    /// under `errors["address"]["city"]`. Each leaf holds the messages for
    /// that path in the order they were found.
    pub fn errors(&self) -> Map<String, Value> {
        let mut errors = Map::new();
        for violation in self.violations() {
            let message = Value::from(violation.message.clone());
            match PropertyPath::parse(&violation.property_path) {
                Ok(path) => path.append(&mut errors, message),
                Err(err) => {
                    self.log.warn(format_args!(
                        "grouping violation under its literal path: {}",
                        err
                    ));
                    let literal = PropertyPath::from_elements([violation.property_path.clone()]);
                    if let Some(literal) = literal {
                        literal.append(&mut errors, message);
                    }
                }
            }
        }
        errors
    }

    /// The declared fields of the last rule set, when the request is valid.
    ///
    /// Returns `None` if the last pass found violations. Declared fields
    /// that were absent from the input are left out.
    pub fn validated(&self) -> Option<Map<String, Value>> {
        if !self.is_valid() {
            return None;
        }
        let mut all = self.all();
        Some(
            self.validated_fields
                .iter()
                .filter_map(|field| all.remove(field).map(|value| (field.clone(), value)))
                .collect(),
        )
    }

    /// The rules provider.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// The wrapped raw request.
    pub fn request(&self) -> &'r dyn RequestSource {
        self.request
    }

    /// Request method of the wrapped request.
    pub fn method(&self) -> HttpMethod {
        self.request.method()
    }

    /// Header of the wrapped request.
    pub fn header(&self, name: &str) -> Option<String> {
        self.request.header(name)
    }

    /// Identifier of the wrapped request, `-` when it has none.
    pub fn request_id(&self) -> &str {
        self.log.request_id()
    }

    /// Logger stamped with this request's id, for handler-side events.
    pub fn log(&self) -> &RequestLog {
        &self.log
    }

    /// Route attribute of the wrapped request.
    ///
    /// An undefined attribute is logged at warn level and reads as `None`.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let value = self.request.attribute(name);
        if value.is_none() {
            self.log
                .warn(format_args!("undefined request attribute '{}'", name));
        }
        value
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for FormRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRequest")
            .field("request_id", &self.log.request_id())
            .field("rules", &self.rules)
            .field("violations", &self.violations)
            .finish_non_exhaustive()
    }
}
