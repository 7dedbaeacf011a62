//! Integration tests for the request wrapper.
//!
//! These tests drive `FormRequest` through the public API only, the way a
//! request handler would.

use std::borrow::Cow;
use std::cell::RefCell;

use form_request::{
    Constraint, FormRequest, HttpMethod, RawRequest, RequestRules, RequestSource, RuleSet,
    UploadedFile, ValidationState, ViolationList,
};
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[test]
fn all_merges_sources_with_query_precedence() {
    let raw = RawRequest::builder()
        .query("shared", json!("query"))
        .query("q", json!(1))
        .body_param("shared", json!("body"))
        .body_param("b", json!(2))
        .file("shared", UploadedFile::new("s.txt", "text/plain", 3, "/tmp/s"))
        .file("avatar", UploadedFile::new("me.png", "image/png", 9, "/tmp/me"))
        .build();

    let form = FormRequest::plain(&raw);
    let all = form.all();

    assert_eq!(all["shared"], json!("query"));
    assert_eq!(all["q"], json!(1));
    assert_eq!(all["b"], json!(2));
    assert_eq!(all["avatar"]["mime_type"], json!("image/png"));
    assert_eq!(all.len(), 4);
}

#[test]
fn json_body_adds_only_missing_keys() {
    let raw = RawRequest::builder()
        .body_param("name", json!("form"))
        .json(&json!({"name": "json", "email": "a@example.com"}))
        .build();

    let form = FormRequest::plain(&raw);

    assert!(form.is_json());
    assert_eq!(
        Value::Object(form.all()),
        json!({"name": "form", "email": "a@example.com"})
    );
}

#[test]
fn malformed_json_equals_plain_merge() {
    let raw = RawRequest::builder()
        .query("page", json!(3))
        .header("Content-Type", "application/json")
        .content(r#"{"name": "#)
        .build();

    let form = FormRequest::plain(&raw);
    assert_eq!(Value::Object(form.all()), json!({"page": 3}));
    assert!(form.is_valid());
}

#[test]
fn projections() {
    let raw = RawRequest::builder()
        .body_param("a", json!(1))
        .body_param("b", json!(2))
        .build();
    let form = FormRequest::plain(&raw);

    assert_eq!(
        Value::Object(form.only(["a", "missing"])),
        json!({"a": 1, "missing": null})
    );
    assert_eq!(Value::Object(form.except(["a"])), json!({"b": 2}));

    let reordered: Vec<String> = form.only(["b", "a"]).keys().cloned().collect();
    assert_eq!(reordered, ["b", "a"]);

    let keys = vec!["a".to_string(), "b".to_string()];
    assert!(form.has(&keys));
    assert!(form.has(["a"]));
    assert!(!form.has(["a", "c"]));
}

#[test]
fn has_counts_empty_values_as_present() {
    let raw = RawRequest::builder()
        .query("flag", json!(null))
        .query("text", json!(""))
        .build();
    let form = FormRequest::plain(&raw);
    assert!(form.has(["flag", "text"]));
}

#[test]
fn content_negotiation() {
    let api = RawRequest::builder()
        .header("Accept", "application/vnd.api+json")
        .header("Content-Type", "application/json; charset=utf-8")
        .build();
    let browser = RawRequest::builder()
        .header("Accept", "text/html")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .build();

    let api = FormRequest::plain(&api);
    let browser = FormRequest::plain(&browser);

    assert!(api.wants_json());
    assert!(api.is_json());
    assert!(!browser.wants_json());
    assert!(!browser.is_json());
}

#[test]
fn blank_name_fails_and_reports_error() {
    let raw = RawRequest::builder().json(&json!({"name": ""})).build();
    let rules = RuleSet::new().field("name", [Constraint::NotBlank]);

    let mut form = FormRequest::plain(&raw);
    let valid = form.validate_with(&rules).is_valid();

    assert!(!valid);
    assert_eq!(form.state(), ValidationState::Invalid);
    let errors = form.errors();
    let messages = errors["name"].as_array().expect("message list");
    assert!(!messages.is_empty());
}

#[test]
fn passing_rules_reset_validity() {
    let raw = RawRequest::builder().body_param("name", json!("")).build();
    let failing = RuleSet::new().field("name", [Constraint::NotBlank]);
    let passing = RuleSet::new().field("name", [Constraint::NotNull]);

    let mut form = FormRequest::with_default_validator(&raw, failing);
    assert!(!form.is_valid());

    assert!(form.validate_with(&passing).is_valid());
    assert!(form.errors().is_empty());

    // the rules hook is still the failing schema
    assert!(!form.validate().is_valid());
}

struct Registration;

impl RequestRules for Registration {
    fn rules(&self) -> RuleSet {
        RuleSet::new()
            .field("password", [Constraint::Length { min: Some(8), max: None }])
            .field("password_confirmation", [Constraint::NotBlank])
    }

    fn after(&self, input: &Map<String, Value>, violations: &mut ViolationList) {
        if input.get("password") != input.get("password_confirmation") {
            violations.add("[password_confirmation]", "The passwords do not match.");
        }
    }
}

#[test]
fn after_hook_adds_cross_field_violations() {
    let raw = RawRequest::builder()
        .body_param("password", json!("correct horse"))
        .body_param("password_confirmation", json!("battery staple"))
        .build();

    let form = FormRequest::with_default_validator(&raw, Registration);

    assert!(!form.is_valid());
    assert_eq!(
        Value::Object(form.errors()),
        json!({"password_confirmation": ["The passwords do not match."]})
    );
}

#[test]
fn after_hook_runs_for_explicit_rules_too() {
    let raw = RawRequest::builder()
        .body_param("password", json!("a"))
        .build();

    let mut form = FormRequest::with_default_validator(&raw, Registration);
    form.validate_with(&RuleSet::new());

    assert_eq!(form.violations().len(), 1);
    assert_eq!(form.violations()[0].message, "The passwords do not match.");
}

#[test]
fn nested_errors_are_nested() {
    let raw = RawRequest::builder()
        .json(&json!({"address": {"street": "Main St 1", "city": ""}}))
        .build();
    let rules = RuleSet::new().nested(
        "address",
        RuleSet::new()
            .field("street", [Constraint::NotBlank])
            .field("city", [Constraint::NotBlank, Constraint::Length { min: Some(2), max: None }]),
    );

    let form = FormRequest::with_default_validator(&raw, rules);

    assert_eq!(
        Value::Object(form.errors()),
        json!({
            "address": {
                "city": [
                    "This value should not be blank.",
                    "This value is too short. It should have 2 characters or more."
                ]
            }
        })
    );
}

/// A request source whose inputs can change while it is borrowed.
#[derive(Default)]
struct LiveRequest {
    query: RefCell<Map<String, Value>>,
}

impl RequestSource for LiveRequest {
    fn query(&self) -> Cow<'_, Map<String, Value>> {
        Cow::Owned(self.query.borrow().clone())
    }

    fn body(&self) -> Cow<'_, Map<String, Value>> {
        Cow::Owned(Map::new())
    }

    fn files(&self) -> Cow<'_, [(String, UploadedFile)]> {
        Cow::Owned(Vec::new())
    }

    fn content(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&[])
    }

    fn header(&self, _name: &str) -> Option<String> {
        None
    }
}

#[test]
fn all_reflects_changes_to_the_source() {
    let live = LiveRequest::default();
    let rules = RuleSet::new().field("token", [Constraint::NotBlank]);
    let mut form = FormRequest::with_default_validator(&live, rules);

    assert!(!form.has(["token"]));
    assert!(!form.is_valid());

    live.query
        .borrow_mut()
        .insert("token".to_string(), json!("abc123"));

    assert_eq!(form.all(), object(json!({"token": "abc123"})));
    assert!(form.validate().is_valid());
}

#[test]
fn delegation_accessors() {
    let raw = RawRequest::builder()
        .request_id("req-7")
        .method(HttpMethod::Delete)
        .attribute("id", json!(7))
        .build();

    let form = FormRequest::plain(&raw);

    assert_eq!(form.request_id(), "req-7");
    assert_eq!(form.method(), HttpMethod::Delete);
    assert_eq!(form.attribute("id"), Some(json!(7)));
    assert_eq!(form.attribute("undefined"), None);
}

#[test]
fn null_json_body_is_wrapped_under_index_key() {
    let raw = RawRequest::builder()
        .header("Content-Type", "application/json")
        .content("null")
        .build();
    let form = FormRequest::plain(&raw);

    assert_eq!(Value::Object(form.all()), json!({"0": null}));
    assert!(form.has(["0"]));
}

#[test]
fn handler_logs_through_request_log() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let raw = RawRequest::builder().request_id("req-42").build();
        let form = FormRequest::plain(&raw);
        let log = form.log();

        assert_eq!(log.request_id(), "req-42");
        assert_eq!(log.request_id(), form.request_id());
        log.debug(format_args!("handler saw {} inputs", form.all().len()));
    });
}

#[test]
fn undefined_attribute_is_logged_not_raised() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let raw = RawRequest::new();
        let form = FormRequest::plain(&raw);
        assert!(form.attribute("slug").is_none());
    });
}
