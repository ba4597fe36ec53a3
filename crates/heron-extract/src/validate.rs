//! Field-level payload checks.
//!
//! A payload type implements [`Validate`] by reporting each constrained
//! field to a [`Checker`]. Messages name the field by its dotted path from
//! the root value, with `[j]` for elements of a nested list:
//!
//! ```text
//! .customer shouldn't be null
//! .lines[1].sku shouldn't be empty
//! ```
//!
//! [`Valid<T>`] decodes like [`Payload<T>`] and answers `400 Bad Request`
//! with the collected messages, one per line, when any check fails.

use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};

use heron_core::StatusError;
use http::StatusCode;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::bind::{DispatchParts, FromDispatch, ParamRole};
use crate::error::DispatchError;
use crate::payload::Payload;

/// A value whose fields carry constraints.
///
/// # Example
///
/// ```
/// use heron_extract::{Checker, Validate};
///
/// struct Line {
///     sku: String,
/// }
///
/// struct Order {
///     reference: String,
///     lines: Vec<Line>,
/// }
///
/// impl Validate for Line {
///     fn validate(&self, check: &mut Checker) {
///         check.not_empty("sku", &self.sku);
///     }
/// }
///
/// impl Validate for Order {
///     fn validate(&self, check: &mut Checker) {
///         check.pattern("reference", &self.reference, "^[A-Z]{2}[0-9]+$");
///         check.each("lines", &self.lines);
///     }
/// }
///
/// let order = Order {
///     reference: "AB12".into(),
///     lines: vec![Line { sku: "x".into() }, Line { sku: String::new() }],
/// };
/// assert_eq!(Checker::run(&order), vec![".lines[1].sku shouldn't be empty"]);
/// ```
pub trait Validate {
    /// Reports every constrained field to `check`.
    fn validate(&self, check: &mut Checker);
}

/// Collects constraint violations under a field path.
#[derive(Debug, Default)]
pub struct Checker {
    path: String,
    errors: Vec<String>,
}

impl Checker {
    /// Creates a checker whose messages start with `root`.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            path: root.into(),
            errors: Vec::new(),
        }
    }

    /// Validates `value` from an empty root and returns the messages.
    #[must_use]
    pub fn run<V: Validate + ?Sized>(value: &V) -> Vec<String> {
        let mut check = Self::default();
        value.validate(&mut check);
        check.into_errors()
    }

    /// Requires an optional field to be present.
    pub fn not_null<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.fail(field, "shouldn't be null");
        }
        self
    }

    /// Requires a string field to be non-empty.
    pub fn not_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.fail(field, "shouldn't be empty");
        }
        self
    }

    /// Requires a string field to match `pattern`.
    ///
    /// The pattern is unanchored. A pattern that does not compile fails
    /// the field.
    pub fn pattern(&mut self, field: &str, value: &str, pattern: &str) -> &mut Self {
        let matched = Regex::new(pattern).is_ok_and(|re| re.is_match(value));
        if !matched {
            self.fail(field, &format!("should match pattern:{pattern}"));
        }
        self
    }

    /// Validates a nested value under `field`.
    pub fn nested<V: Validate + ?Sized>(&mut self, field: &str, value: &V) -> &mut Self {
        let depth = self.path.len();
        let _ = write!(self.path, ".{field}");
        value.validate(self);
        self.path.truncate(depth);
        self
    }

    /// Validates a nested value when it is present.
    pub fn nested_opt<V: Validate>(&mut self, field: &str, value: &Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.nested(field, value);
        }
        self
    }

    /// Validates each element of a list under `field[j]`.
    pub fn each<V: Validate>(&mut self, field: &str, items: &[V]) -> &mut Self {
        let depth = self.path.len();
        for (j, item) in items.iter().enumerate() {
            let _ = write!(self.path, ".{field}[{j}]");
            item.validate(self);
            self.path.truncate(depth);
        }
        self
    }

    /// Returns true if no check has failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the messages collected so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consumes the checker and returns its messages in check order.
    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn fail(&mut self, field: &str, reason: &str) {
        self.errors.push(format!("{}.{field} {reason}", self.path));
    }
}

/// A request body that must pass [`Validate`] before the handler runs.
///
/// Decoding follows [`Payload<T>`]. A failed check answers `400` with one
/// message per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Valid<T>(pub T);

impl<T> Valid<T> {
    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Validate> Valid<T> {
    /// Checks `value`, failing with `400 Bad Request` listing each violation.
    pub fn check(value: T) -> Result<Self, DispatchError> {
        let errors = Checker::run(&value);
        if errors.is_empty() {
            Ok(Self(value))
        } else {
            Err(StatusError::new(StatusCode::BAD_REQUEST, errors.join("\n")).into())
        }
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Valid<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromDispatch for Valid<T>
where
    T: DeserializeOwned + Default + Validate + Send + 'static,
{
    const ROLE: ParamRole = ParamRole::Payload;

    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError> {
        let Payload(value) = Payload::<T>::from_request(parts.request())?;
        Self::check(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Address {
        city: String,
        zip: String,
    }

    #[derive(Debug, Default)]
    struct Item {
        name: String,
    }

    #[derive(Debug, Default)]
    struct Customer {
        email: String,
        nickname: Option<String>,
        address: Address,
        billing: Option<Address>,
        items: Vec<Item>,
    }

    impl Validate for Address {
        fn validate(&self, check: &mut Checker) {
            check.not_empty("city", &self.city).pattern("zip", &self.zip, "^[0-9]{5}$");
        }
    }

    impl Validate for Item {
        fn validate(&self, check: &mut Checker) {
            check.not_empty("name", &self.name);
        }
    }

    impl Validate for Customer {
        fn validate(&self, check: &mut Checker) {
            check
                .pattern("email", &self.email, r"^[^@\s]+@[^@\s]+$")
                .not_null("nickname", &self.nickname)
                .nested("address", &self.address)
                .nested_opt("billing", &self.billing)
                .each("items", &self.items);
        }
    }

    fn valid_customer() -> Customer {
        Customer {
            email: "ada@example.com".into(),
            nickname: Some("ada".into()),
            address: Address {
                city: "London".into(),
                zip: "12345".into(),
            },
            billing: None,
            items: vec![Item { name: "pen".into() }],
        }
    }

    #[test]
    fn test_valid_value_has_no_errors() {
        assert!(Checker::run(&valid_customer()).is_empty());
    }

    #[test]
    fn test_top_level_messages() {
        let customer = Customer {
            email: "nobody".into(),
            nickname: None,
            ..valid_customer()
        };
        assert_eq!(
            Checker::run(&customer),
            vec![
                ".email should match pattern:^[^@\\s]+@[^@\\s]+$",
                ".nickname shouldn't be null",
            ]
        );
    }

    #[test]
    fn test_nested_paths() {
        let customer = Customer {
            address: Address {
                city: String::new(),
                zip: "1234".into(),
            },
            billing: Some(Address {
                city: String::new(),
                zip: "54321".into(),
            }),
            ..valid_customer()
        };
        assert_eq!(
            Checker::run(&customer),
            vec![
                ".address.city shouldn't be empty",
                ".address.zip should match pattern:^[0-9]{5}$",
                ".billing.city shouldn't be empty",
            ]
        );
    }

    #[test]
    fn test_list_elements_are_indexed() {
        let customer = Customer {
            items: vec![
                Item { name: "ink".into() },
                Item { name: String::new() },
                Item { name: String::new() },
            ],
            ..valid_customer()
        };
        assert_eq!(
            Checker::run(&customer),
            vec![".items[1].name shouldn't be empty", ".items[2].name shouldn't be empty"]
        );
    }

    #[test]
    fn test_root_prefix_and_bad_pattern() {
        let mut check = Checker::new("order");
        check.pattern("code", "anything", "([unclosed");
        assert!(!check.is_valid());
        assert_eq!(check.errors(), ["order.code should match pattern:([unclosed"]);
    }

    #[test]
    fn test_valid_rejects_with_bad_request() {
        let customer = Customer {
            nickname: None,
            items: vec![Item::default()],
            ..valid_customer()
        };
        let err = Valid::check(customer).unwrap_err();
        let status = err.as_status().unwrap();
        assert_eq!(status.code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            status.message(),
            ".nickname shouldn't be null\n.items[0].name shouldn't be empty"
        );

        let Valid(ok) = Valid::check(valid_customer()).unwrap();
        assert_eq!(ok.email, "ada@example.com");
    }
}
