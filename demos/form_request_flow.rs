//! Form request flow demonstration.
//!
//! This example shows how a request handler uses form-request:
//! 1. Build (or adapt) the raw request
//! 2. Wrap it with the rules of the endpoint
//! 3. Check validity and answer with grouped errors
//! 4. Use the validated input
//!
//! Run with: `cargo run --example form_request_flow`

use form_request::{
    Constraint, FormRequest, HttpMethod, RawRequest, RequestRules, RuleSet, ViolationList,
};
use serde_json::{json, Map, Value};

/// Rules of a hypothetical `POST /articles` endpoint.
struct CreateArticle;

impl RequestRules for CreateArticle {
    fn rules(&self) -> RuleSet {
        RuleSet::new()
            .field(
                "title",
                [
                    Constraint::NotBlank,
                    Constraint::Length {
                        min: Some(3),
                        max: Some(120),
                    },
                ],
            )
            .field("status", [Constraint::choice(["draft", "published"])])
            .optional("publish_at", [Constraint::NotBlank])
    }

    fn after(&self, input: &Map<String, Value>, violations: &mut ViolationList) {
        let published = input.get("status") == Some(&json!("published"));
        if published && !input.contains_key("publish_at") {
            violations.add("[publish_at]", "Published articles need a publication date.");
        }
    }
}

fn handle(raw: &RawRequest) -> (u16, Value) {
    let form = FormRequest::with_default_validator(raw, CreateArticle);
    println!("   Request {} ({})", form.request_id(), form.method());

    if !form.is_valid() {
        let body = if form.wants_json() {
            json!({ "errors": form.errors() })
        } else {
            json!(form.violations().iter().map(ToString::to_string).collect::<Vec<_>>())
        };
        return (422, body);
    }

    match form.validated() {
        Some(article) => {
            form.log()
                .debug(format_args!("creating article with {} fields", article.len()));
            (201, Value::Object(article))
        }
        None => (500, Value::Null),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Valid article ===");
    let raw = RawRequest::builder()
        .request_id("req-001")
        .method(HttpMethod::Post)
        .header("Accept", "application/json")
        .json(&json!({"title": "Borrowing without tears", "status": "draft", "internal": 1}))
        .build();
    let (status, body) = handle(&raw);
    println!("   {} {}", status, body);

    println!("\n=== Invalid article ===");
    let raw = RawRequest::builder()
        .request_id("req-002")
        .method(HttpMethod::Post)
        .header("Accept", "application/json")
        .json(&json!({"title": "", "status": "published"}))
        .build();
    let (status, body) = handle(&raw);
    println!("   {} {}", status, body);

    println!("\n=== Form post from a browser ===");
    let raw = RawRequest::builder()
        .request_id("req-003")
        .method(HttpMethod::Post)
        .header("Accept", "text/html")
        .body_param("title", json!("Hi"))
        .body_param("status", json!("archived"))
        .build();
    let (status, body) = handle(&raw);
    println!("   {} {}", status, body);
}
