use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

/// JSON value kinds accepted by [`Constraint::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// A JSON string
    String,
    /// A JSON number without fractional part
    Integer,
    /// Any JSON number
    Number,
    /// `true` or `false`
    Boolean,
    /// A JSON array
    Array,
    /// A JSON object
    Object,
}

impl ValueType {
    fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Integer => write!(f, "int"),
            ValueType::Number => write!(f, "numeric"),
            ValueType::Boolean => write!(f, "bool"),
            ValueType::Array => write!(f, "array"),
            ValueType::Object => write!(f, "object"),
        }
    }
}

/// A check applied to a single field value.
///
/// Apart from [`NotBlank`](Constraint::NotBlank) and
/// [`NotNull`](Constraint::NotNull), every constraint accepts `null`;
/// combine them with one of those two to make a value mandatory.
///
/// # Examples
///
/// ```
/// use form_request::Constraint;
/// use serde_json::json;
///
/// let length = Constraint::Length { min: Some(2), max: Some(5) };
/// assert!(length.check(&json!("abc")).is_ok());
/// assert_eq!(
///     length.check(&json!("a")).unwrap_err(),
///     "This value is too short. It should have 2 characters or more."
/// );
/// ```
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Rejects `null`, `false`, empty strings, empty arrays and empty objects.
    NotBlank,
    /// Rejects `null`.
    NotNull,
    /// Character count of a string (numbers are measured by their decimal form).
    Length {
        /// Minimum number of characters
        min: Option<usize>,
        /// Maximum number of characters
        max: Option<usize>,
    },
    /// Numeric bounds; numeric strings are accepted.
    Range {
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
    },
    /// The string form must match the expression.
    Pattern(Regex),
    /// The value must equal one of the listed values.
    Choice(Vec<Value>),
    /// The value must be of the given JSON kind.
    Type(ValueType),
}

impl Constraint {
    /// Builds a [`Pattern`](Constraint::Pattern) constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Constraint::Pattern)
            .map_err(|err| Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })
    }

    /// Builds a [`Choice`](Constraint::Choice) constraint.
    pub fn choice<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Constraint::Choice(values.into_iter().map(Into::into).collect())
    }

    /// Checks `value`, returning the violation message on failure.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            Constraint::NotBlank => {
                if is_blank(value) {
                    Err("This value should not be blank.".to_string())
                } else {
                    Ok(())
                }
            }
            Constraint::NotNull => {
                if value.is_null() {
                    Err("This value should not be null.".to_string())
                } else {
                    Ok(())
                }
            }
            Constraint::Length { min, max } => check_length(value, *min, *max),
            Constraint::Range { min, max } => check_range(value, *min, *max),
            Constraint::Pattern(regex) => {
                if value.is_null() {
                    return Ok(());
                }
                let text = string_form(value)?;
                if regex.is_match(&text) {
                    Ok(())
                } else {
                    Err("This value is not valid.".to_string())
                }
            }
            Constraint::Choice(choices) => {
                if value.is_null() || choices.contains(value) {
                    Ok(())
                } else {
                    Err("The value you selected is not a valid choice.".to_string())
                }
            }
            Constraint::Type(expected) => {
                if value.is_null() || expected.matches(value) {
                    Ok(())
                } else {
                    Err(format!("This value should be of type {}.", expected))
                }
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

fn string_form(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(format!("This value should be of type {}.", ValueType::String)),
    }
}

fn characters(count: usize) -> &'static str {
    if count == 1 {
        "character"
    } else {
        "characters"
    }
}

fn check_length(
    value: &Value,
    min: Option<usize>,
    max: Option<usize>,
) -> std::result::Result<(), String> {
    if value.is_null() {
        return Ok(());
    }
    let length = string_form(value)?.chars().count();

    if let (Some(min), Some(max)) = (min, max) {
        if min == max && length != min {
            return Err(format!(
                "This value should have exactly {} {}.",
                min,
                characters(min)
            ));
        }
    }
    if let Some(min) = min.filter(|&min| length < min) {
        return Err(format!(
            "This value is too short. It should have {} {} or more.",
            min,
            characters(min)
        ));
    }
    if let Some(max) = max.filter(|&max| length > max) {
        return Err(format!(
            "This value is too long. It should have {} {} or less.",
            max,
            characters(max)
        ));
    }
    Ok(())
}

fn check_range(value: &Value, min: Option<f64>, max: Option<f64>) -> std::result::Result<(), String> {
    let number = match value {
        Value::Null => return Ok(()),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(number) = number.filter(|n| n.is_finite()) else {
        return Err("This value should be a valid number.".to_string());
    };

    let below = min.is_some_and(|min| number < min);
    let above = max.is_some_and(|max| number > max);
    match (min, max) {
        (Some(min), Some(max)) if below || above => Err(format!(
            "This value should be between {} and {}.",
            min, max
        )),
        (Some(min), _) if below => Err(format!("This value should be {} or more.", min)),
        (_, Some(max)) if above => Err(format!("This value should be {} or less.", max)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_blank_rejects_empty_values() {
        for blank in [json!(null), json!(""), json!(false), json!([]), json!({})] {
            assert_eq!(
                Constraint::NotBlank.check(&blank).unwrap_err(),
                "This value should not be blank."
            );
        }
        for filled in [json!("x"), json!(0), json!(true), json!([1]), json!(" ")] {
            assert!(Constraint::NotBlank.check(&filled).is_ok());
        }
    }

    #[test]
    fn not_null_only_rejects_null() {
        assert!(Constraint::NotNull.check(&json!(null)).is_err());
        assert!(Constraint::NotNull.check(&json!("")).is_ok());
    }

    #[test]
    fn length_counts_characters() {
        let c = Constraint::Length {
            min: None,
            max: Some(3),
        };
        assert!(c.check(&json!("äöü")).is_ok());
        assert_eq!(
            c.check(&json!("abcd")).unwrap_err(),
            "This value is too long. It should have 3 characters or less."
        );
        assert!(c.check(&json!(123)).is_ok());
        assert!(c.check(&json!(null)).is_ok());
        assert_eq!(
            c.check(&json!(["a"])).unwrap_err(),
            "This value should be of type string."
        );
    }

    #[test]
    fn length_exact_and_singular_messages() {
        let exact = Constraint::Length {
            min: Some(4),
            max: Some(4),
        };
        assert_eq!(
            exact.check(&json!("abc")).unwrap_err(),
            "This value should have exactly 4 characters."
        );

        let one = Constraint::Length {
            min: Some(1),
            max: None,
        };
        assert_eq!(
            one.check(&json!("")).unwrap_err(),
            "This value is too short. It should have 1 character or more."
        );
    }

    #[test]
    fn range_bounds_and_numeric_strings() {
        let adult = Constraint::Range {
            min: Some(18.0),
            max: None,
        };
        assert!(adult.check(&json!(18)).is_ok());
        assert!(adult.check(&json!("21")).is_ok());
        assert_eq!(
            adult.check(&json!(17)).unwrap_err(),
            "This value should be 18 or more."
        );
        assert_eq!(
            adult.check(&json!("old")).unwrap_err(),
            "This value should be a valid number."
        );

        let between = Constraint::Range {
            min: Some(1.0),
            max: Some(5.5),
        };
        assert_eq!(
            between.check(&json!(6)).unwrap_err(),
            "This value should be between 1 and 5.5."
        );
    }

    #[test]
    fn pattern_matches_string_form() {
        let zip = Constraint::pattern(r"^\d{4}[A-Z]{2}$").unwrap();
        assert!(zip.check(&json!("1234AB")).is_ok());
        assert_eq!(zip.check(&json!("12")).unwrap_err(), "This value is not valid.");

        let digits = Constraint::pattern(r"^\d+$").unwrap();
        assert!(digits.check(&json!(42)).is_ok());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = Constraint::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn choice_and_type() {
        let status = Constraint::choice(["draft", "published"]);
        assert!(status.check(&json!("draft")).is_ok());
        assert_eq!(
            status.check(&json!("deleted")).unwrap_err(),
            "The value you selected is not a valid choice."
        );

        let int = Constraint::Type(ValueType::Integer);
        assert!(int.check(&json!(3)).is_ok());
        assert_eq!(
            int.check(&json!(3.5)).unwrap_err(),
            "This value should be of type int."
        );
        assert!(int.check(&json!(null)).is_ok());
    }
}
