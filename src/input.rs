//! Input aggregation.
//!
//! Merges the query string, body parameters, uploaded files and (for JSON
//! requests) the decoded body into one insertion-ordered map. Earlier
//! sources win on key collisions: query, then body, then files, then JSON.

use serde_json::{Map, Value};

use crate::logging::RequestLog;
use crate::request::{is_json_media_type, RequestSource};

/// Builds the aggregated input of `source`.
///
/// A JSON body that fails to decode is skipped; the result then only holds
/// the query, body and file entries. Decoded objects contribute their
/// entries, arrays contribute index keys (`"0"`, `"1"`, ...) and any other
/// value is treated as a one-element array.
pub fn aggregate(source: &dyn RequestSource, log: &RequestLog) -> Map<String, Value> {
    let mut input = Map::new();

    overlay(&mut input, source.query().iter().map(|(k, v)| (k.clone(), v.clone())));
    overlay(&mut input, source.body().iter().map(|(k, v)| (k.clone(), v.clone())));
    overlay(
        &mut input,
        source
            .files()
            .iter()
            .map(|(field, file)| (field.clone(), file.to_value())),
    );

    if is_json(source) {
        let content = source.content();
        if !content.is_empty() {
            match serde_json::from_slice::<Value>(&content) {
                Ok(decoded) => overlay(&mut input, json_entries(decoded)),
                Err(err) => log.debug(format_args!("skipping undecodable JSON body: {}", err)),
            }
        }
    }

    input
}

/// Returns `true` if the request body is declared as JSON.
pub fn is_json(source: &dyn RequestSource) -> bool {
    source
        .content_type()
        .is_some_and(|content_type| is_json_media_type(&content_type))
}

/// Returns `true` if the client accepts a JSON response.
pub fn wants_json(source: &dyn RequestSource) -> bool {
    source
        .acceptable_content_types()
        .iter()
        .any(|media_type| is_json_media_type(media_type))
}

/// Projects `input` onto exactly `keys`, in the order given.
///
/// Keys missing from `input` are present in the result with a `null` value.
pub fn only<I>(input: &Map<String, Value>, keys: I) -> Map<String, Value>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keys.into_iter()
        .map(|key| {
            let key = key.as_ref();
            (key.to_string(), input.get(key).cloned().unwrap_or(Value::Null))
        })
        .collect()
}

/// Removes `keys` from `input`. Keys that are not present are ignored.
pub fn except<I>(mut input: Map<String, Value>, keys: I) -> Map<String, Value>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let removed: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
    input.retain(|key, _| !removed.contains(key));
    input
}

/// Returns `true` if every key is present in `input`, whatever its value.
pub fn has<I>(input: &Map<String, Value>, keys: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keys.into_iter().all(|key| input.contains_key(key.as_ref()))
}

// first write wins
fn overlay<I>(input: &mut Map<String, Value>, entries: I)
where
    I: IntoIterator<Item = (String, Value)>,
{
    for (key, value) in entries {
        input.entry(key).or_insert(value);
    }
}

fn json_entries(decoded: Value) -> Vec<(String, Value)> {
    match decoded {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => indexed(items),
        scalar => indexed(vec![scalar]),
    }
}

fn indexed(items: Vec<Value>) -> Vec<(String, Value)> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}
