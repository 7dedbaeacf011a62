//! Nested reads and writes on JSON-like maps addressed by property paths.
//!
//! A property path is a sequence of keys written either with dots
//! (`address.city`), with brackets (`[address][city]`), or a mix of both
//! (`items[0].name`). Bracket notation is what [`RuleValidator`](crate::RuleValidator)
//! emits for violation paths.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A parsed property path.
///
/// # Examples
///
/// ```
/// use form_request::PropertyPath;
///
/// let path: PropertyPath = "items[0].name".parse().unwrap();
/// assert_eq!(path.elements(), ["items", "0", "name"]);
/// assert_eq!(path.to_string(), "[items][0][name]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    elements: Vec<String>,
}

impl PropertyPath {
    /// Parses a path in dotted, bracketed or mixed notation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPropertyPath`] for empty paths, empty
    /// segments (`a..b`, `[]`), unclosed brackets and stray characters
    /// after a closing bracket.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidPropertyPath {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut elements = Vec::new();
        let mut rest = path;

        while !rest.is_empty() {
            if let Some(inner) = rest.strip_prefix('[') {
                let end = inner.find(']').ok_or_else(|| invalid("unclosed bracket"))?;
                if end == 0 {
                    return Err(invalid("empty brackets"));
                }
                elements.push(inner[..end].to_string());
                rest = &inner[end + 1..];
            } else {
                let end = rest.find(['.', '[']).unwrap_or(rest.len());
                let segment = &rest[..end];
                if segment.is_empty() {
                    return Err(invalid("empty segment"));
                }
                if segment.contains(']') {
                    return Err(invalid("unexpected closing bracket"));
                }
                elements.push(segment.to_string());
                rest = &rest[end..];
            }

            rest = match rest.as_bytes().first().copied() {
                None | Some(b'[') => rest,
                Some(b'.') => {
                    let next = &rest[1..];
                    if next.is_empty() || next.starts_with(['.', '[']) {
                        return Err(invalid("empty segment"));
                    }
                    next
                }
                Some(_) => return Err(invalid("expected '.' or '[' after ']'")),
            };
        }

        Ok(Self { elements })
    }

    /// Builds a path from already separated keys.
    ///
    /// Returns `None` when `elements` is empty.
    pub fn from_elements<I, S>(elements: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements: Vec<String> = elements.into_iter().map(Into::into).collect();
        if elements.is_empty() {
            None
        } else {
            Some(Self { elements })
        }
    }

    /// The individual keys of this path.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Reads the value at this path.
    ///
    /// Objects are indexed by key and arrays by numeric index. Any other
    /// value on the way, or a missing key, yields `None`.
    pub fn read<'v>(&self, root: &'v Map<String, Value>) -> Option<&'v Value> {
        let (first, rest) = self.elements.split_first()?;
        rest.iter()
            .try_fold(root.get(first)?, |current, key| child(current, key))
    }

    /// Appends `item` to the list stored at this path, creating every
    /// missing level on the way.
    ///
    /// A list that has to become a branch is turned into an object keyed by
    /// its indices. Appending to an object stores the item under the next
    /// free integer key.
    pub fn append(&self, root: &mut Map<String, Value>, item: Value) {
        append_at(root, &self.elements, item);
    }
}

impl FromStr for PropertyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "[{}]", element)?;
        }
        Ok(())
    }
}

fn child<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn append_at(node: &mut Map<String, Value>, keys: &[String], item: Value) {
    let Some((key, rest)) = keys.split_first() else {
        return;
    };

    if rest.is_empty() {
        let slot = node
            .entry(key.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(item),
            Value::Object(map) => {
                let index = next_index(map).to_string();
                map.insert(index, item);
            }
            other => {
                let previous = std::mem::take(other);
                *other = Value::Array(vec![previous, item]);
            }
        }
        return;
    }

    // The slot stays in place while its branch is rebuilt so sibling order is kept.
    let slot = node.entry(key.clone()).or_insert(Value::Null);
    let mut branch = into_branch(std::mem::take(slot));
    append_at(&mut branch, rest, item);
    *slot = Value::Object(branch);
}

fn into_branch(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => Map::new(),
        scalar => {
            let mut map = Map::new();
            map.insert("0".to_string(), scalar);
            map
        }
    }
}

fn next_index(map: &Map<String, Value>) -> usize {
    map.keys()
        .filter_map(|k| k.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1)
}
