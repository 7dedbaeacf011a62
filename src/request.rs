//! The raw request boundary.
//!
//! [`RequestSource`] is the only thing this crate needs from a web
//! framework: query and body parameters, uploaded files, the raw body and a
//! handful of headers. Framework integrations implement it for their own
//! request type; [`RawRequest`] is an owned implementation for everything
//! else (tests, CLI tools, adapters that copy the request once).

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP HEAD method
    Head,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
    /// HTTP OPTIONS method
    Options,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Options => write!(f, "OPTIONS"),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

/// Metadata of a file uploaded with the request.
///
/// The file contents are not held in memory; `path` points at wherever the
/// framework stored the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub client_name: String,
    /// MIME type as sent by the client
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Location of the stored upload
    pub path: String,
}

impl UploadedFile {
    /// Creates file metadata.
    pub fn new(
        client_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            mime_type: mime_type.into(),
            size,
            path: path.into(),
        }
    }

    /// Representation used inside the aggregated input.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("client_name".to_string(), Value::from(self.client_name.clone()));
        map.insert("mime_type".to_string(), Value::from(self.mime_type.clone()));
        map.insert("size".to_string(), Value::from(self.size));
        map.insert("path".to_string(), Value::from(self.path.clone()));
        Value::Object(map)
    }
}

/// Returns `true` if a media type names a JSON document.
///
/// Matches `application/json`, `text/json` and structured-syntax suffixes
/// such as `application/vnd.api+json`. Parameters are ignored.
pub fn is_json_media_type(media_type: &str) -> bool {
    media_type.contains("/json") || media_type.contains("+json")
}

/// Parses an `Accept` header into media types, highest quality first.
///
/// Parameters other than `q` are dropped. Entries with equal quality keep
/// their header order; entries with `q=0` are kept last.
pub fn parse_accept(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';');
            let media_type = params.next()?.trim();
            if media_type.is_empty() {
                return None;
            }
            let quality = params
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((media_type.to_ascii_lowercase(), quality))
        })
        .collect();

    // stable: equal qualities keep header order
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(media_type, _)| media_type).collect()
}

/// Read access to the inbound HTTP request.
///
/// Every method is called again on each aggregation, so implementations
/// backed by interior mutability are observed live.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use form_request::{RequestSource, UploadedFile};
/// use serde_json::{Map, Value};
///
/// struct QueryOnly(Map<String, Value>);
///
/// impl RequestSource for QueryOnly {
///     fn query(&self) -> Cow<'_, Map<String, Value>> {
///         Cow::Borrowed(&self.0)
///     }
///     fn body(&self) -> Cow<'_, Map<String, Value>> {
///         Cow::Owned(Map::new())
///     }
///     fn files(&self) -> Cow<'_, [(String, UploadedFile)]> {
///         Cow::Owned(Vec::new())
///     }
///     fn content(&self) -> Cow<'_, [u8]> {
///         Cow::Borrowed(&[])
///     }
///     fn header(&self, _name: &str) -> Option<String> {
///         None
///     }
/// }
/// ```
pub trait RequestSource {
    /// Query string parameters.
    fn query(&self) -> Cow<'_, Map<String, Value>>;

    /// Decoded body parameters (form fields).
    fn body(&self) -> Cow<'_, Map<String, Value>>;

    /// Uploaded files keyed by field name, in upload order.
    fn files(&self) -> Cow<'_, [(String, UploadedFile)]>;

    /// Raw request body.
    fn content(&self) -> Cow<'_, [u8]>;

    /// Header lookup; names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<String>;

    /// The `Content-Type` header.
    fn content_type(&self) -> Option<String> {
        self.header("content-type")
    }

    /// Media types from the `Accept` header, highest quality first.
    fn acceptable_content_types(&self) -> Vec<String> {
        self.header("accept")
            .map(|accept| parse_accept(&accept))
            .unwrap_or_default()
    }

    /// Route attribute (path parameter) lookup.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Request method.
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Identifier used to correlate trace events, if the framework assigns one.
    fn request_id(&self) -> Option<String> {
        None
    }
}

/// An owned request implementing [`RequestSource`].
///
/// Build one with [`RawRequest::builder`]. Mutating accessors are provided
/// so a request can be adjusted between wrapper lifetimes.
///
/// # Examples
///
/// ```
/// use form_request::{HttpMethod, RawRequest, RequestSource};
/// use serde_json::json;
///
/// let request = RawRequest::builder()
///     .method(HttpMethod::Post)
///     .query("page", json!(2))
///     .body_param("name", json!("Alice"))
///     .header("Content-Type", "application/x-www-form-urlencoded")
///     .build();
///
/// assert_eq!(request.method(), HttpMethod::Post);
/// assert_eq!(request.query()["page"], json!(2));
/// assert!(request.header("content-type").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    method: HttpMethod,
    request_id: Option<String>,
    query: Map<String, Value>,
    body: Map<String, Value>,
    files: Vec<(String, UploadedFile)>,
    content: Vec<u8>,
    headers: Vec<(String, String)>,
    attributes: Map<String, Value>,
}

impl RawRequest {
    /// Creates an empty GET request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a request.
    pub fn builder() -> RawRequestBuilder {
        RawRequestBuilder::default()
    }

    /// Sets a query parameter, replacing any previous value.
    pub fn set_query(&mut self, key: impl Into<String>, value: Value) {
        self.query.insert(key.into(), value);
    }

    /// Sets a body parameter, replacing any previous value.
    pub fn set_body_param(&mut self, key: impl Into<String>, value: Value) {
        self.body.insert(key.into(), value);
    }

    /// Replaces the raw body.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    /// Sets a header, replacing every existing header with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Sets a route attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }
}

impl RequestSource for RawRequest {
    fn query(&self) -> Cow<'_, Map<String, Value>> {
        Cow::Borrowed(&self.query)
    }

    fn body(&self) -> Cow<'_, Map<String, Value>> {
        Cow::Borrowed(&self.body)
    }

    fn files(&self) -> Cow<'_, [(String, UploadedFile)]> {
        Cow::Borrowed(&self.files)
    }

    fn content(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.content)
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn request_id(&self) -> Option<String> {
        self.request_id.clone()
    }
}

/// Builder for [`RawRequest`].
#[derive(Debug, Default)]
pub struct RawRequestBuilder {
    request: RawRequest,
}

impl RawRequestBuilder {
    /// Sets the request method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Sets the request identifier.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request.request_id = Some(id.into());
        self
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: Value) -> Self {
        self.request.set_query(key, value);
        self
    }

    /// Adds a body parameter.
    pub fn body_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.request.set_body_param(key, value);
        self
    }

    /// Adds an uploaded file under `field`.
    pub fn file(mut self, field: impl Into<String>, file: UploadedFile) -> Self {
        self.request.files.push((field.into(), file));
        self
    }

    /// Sets the raw body.
    pub fn content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.request.set_content(content);
        self
    }

    /// Sets a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.set_header(name, value);
        self
    }

    /// Shorthand for a JSON body with a matching `Content-Type`.
    pub fn json(self, body: &Value) -> Self {
        self.header("Content-Type", "application/json")
            .content(body.to_string())
    }

    /// Sets a route attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.request.set_attribute(name, value);
        self
    }

    /// Finishes the request.
    pub fn build(self) -> RawRequest {
        self.request
    }
}
