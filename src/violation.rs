use std::fmt;

use serde::Serialize;

/// A single validation failure tied to a property path.
///
/// Paths use the bracket notation produced by [`RuleValidator`](crate::RuleValidator),
/// for example `[name]` or `[address][city]`. Custom validators and
/// post-validation hooks may use any notation understood by
/// [`PropertyPath`](crate::PropertyPath).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Where in the input the failure occurred
    pub property_path: String,
    /// Human-readable message
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_path, self.message)
    }
}

/// Ordered list of violations produced by one validation pass.
///
/// An empty list means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationList {
    violations: Vec<Violation>,
}

impl ViolationList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation at `property_path`.
    pub fn add(&mut self, property_path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(property_path, message));
    }

    /// Returns `true` if no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Iterates in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Borrows the violations as a slice.
    pub fn as_slice(&self) -> &[Violation] {
        &self.violations
    }
}

impl FromIterator<Violation> for ViolationList {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ViolationList {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keeps_encounter_order() {
        let mut list = ViolationList::new();
        list.add("[b]", "second field");
        list.add("[a]", "first message");
        list.add("[b]", "another");

        let paths: Vec<&str> = list.iter().map(|v| v.property_path.as_str()).collect();
        assert_eq!(paths, vec!["[b]", "[a]", "[b]"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn serializes_as_plain_array() {
        let list: ViolationList = vec![Violation::new("[name]", "This value should not be blank.")]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(
            json,
            r#"[{"property_path":"[name]","message":"This value should not be blank."}]"#
        );
    }

    #[test]
    fn display_joins_path_and_message() {
        let v = Violation::new("[age]", "This value should be 18 or more.");
        assert_eq!(v.to_string(), "[age]: This value should be 18 or more.");
    }
}
