//! Handler return values.
//!
//! A handler's return type implements [`IntoOutputs`], which flattens it
//! into an ordered list of [`Output`]s. The dispatcher serializes each
//! output in that order:
//!
//! | Return type | Output |
//! |-------------|--------|
//! | [`Template`], `String`, `&'static str` | [`Output::Template`] |
//! | [`Json<T>`], `serde_json::Value` | [`Output::Structured`] |
//! | `Bytes`, `Vec<u8>` | [`Output::Raw`] |
//! | `HandlerError`, `StatusError`, the `Err` of a `Result` | [`Output::Error`] |
//! | `()`, `None` | nothing |
//!
//! Tuples of up to four return types produce the outputs of each element
//! in order.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;
use heron_core::{HandlerError, StatusError};
use serde::Serialize;
use serde_json::Value;

/// The declared shape of one handler output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// A template to render.
    Template,
    /// A handler error, possibly absent.
    Error,
    /// A JSON document.
    Structured,
    /// Raw bytes.
    Raw,
    /// No output.
    Unit,
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => f.write_str("template"),
            Self::Error => f.write_str("error"),
            Self::Structured => f.write_str("structured"),
            Self::Raw => f.write_str("raw"),
            Self::Unit => f.write_str("unit"),
        }
    }
}

/// One value produced by a handler, ready for serialization.
#[derive(Debug)]
pub enum Output {
    /// Render the named template with the request's data bag.
    Template(String),
    /// A present error; becomes the dispatch result.
    Error(HandlerError),
    /// An encoded JSON document, or the encoder's error text.
    Structured(Result<Bytes, String>),
    /// Bytes written verbatim.
    Raw(Bytes),
}

impl Output {
    /// Encodes `value` as a structured output.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::Structured(
            serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| e.to_string()),
        )
    }
}

/// A template name returned from a handler.
///
/// # Example
///
/// ```
/// use heron_extract::Template;
///
/// async fn index() -> Template {
///     Template::new("index.html")
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template(pub String);

impl Template {
    /// Creates a template output.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A value serialized as a JSON response body.
///
/// Sets `Content-Type: application/json`.
///
/// # Example
///
/// ```
/// use heron_extract::Json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: String,
/// }
///
/// async fn show() -> Json<User> {
///     Json(User { id: "42".into() })
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A handler return type.
pub trait IntoOutputs: Send + 'static {
    /// The declared output shapes, recorded at registration.
    fn shapes() -> Vec<ReturnShape>;

    /// Flattens the value into outputs, in declared order.
    fn into_outputs(self) -> Vec<Output>;
}

impl IntoOutputs for () {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Unit]
    }

    fn into_outputs(self) -> Vec<Output> {
        Vec::new()
    }
}

impl IntoOutputs for Template {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Template]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Template(self.0)]
    }
}

impl IntoOutputs for String {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Template]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Template(self)]
    }
}

impl IntoOutputs for &'static str {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Template]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Template(self.to_string())]
    }
}

impl<T: Serialize + Send + 'static> IntoOutputs for Json<T> {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Structured]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::json(&self.0)]
    }
}

impl IntoOutputs for Value {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Structured]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::json(&self)]
    }
}

impl IntoOutputs for Bytes {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Raw]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Raw(self)]
    }
}

impl IntoOutputs for Vec<u8> {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Raw]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Raw(Bytes::from(self))]
    }
}

impl IntoOutputs for HandlerError {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Error]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Error(self)]
    }
}

impl IntoOutputs for StatusError {
    fn shapes() -> Vec<ReturnShape> {
        vec![ReturnShape::Error]
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Error(self.into())]
    }
}

impl<T: IntoOutputs> IntoOutputs for Option<T> {
    fn shapes() -> Vec<ReturnShape> {
        T::shapes()
    }

    fn into_outputs(self) -> Vec<Output> {
        self.map_or_else(Vec::new, IntoOutputs::into_outputs)
    }
}

impl<T, E> IntoOutputs for Result<T, E>
where
    T: IntoOutputs,
    E: Into<HandlerError> + Send + 'static,
{
    fn shapes() -> Vec<ReturnShape> {
        let mut shapes = T::shapes();
        shapes.push(ReturnShape::Error);
        shapes
    }

    fn into_outputs(self) -> Vec<Output> {
        match self {
            Ok(value) => value.into_outputs(),
            Err(err) => vec![Output::Error(err.into())],
        }
    }
}

macro_rules! impl_into_outputs_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: IntoOutputs),*> IntoOutputs for ($($T,)*) {
            fn shapes() -> Vec<ReturnShape> {
                let mut shapes = Vec::new();
                $(shapes.extend($T::shapes());)*
                shapes
            }

            #[allow(non_snake_case)]
            fn into_outputs(self) -> Vec<Output> {
                let ($($T,)*) = self;
                let mut outputs = Vec::new();
                $(outputs.extend($T.into_outputs());)*
                outputs
            }
        }
    };
}

impl_into_outputs_for_tuple!(T1, T2);
impl_into_outputs_for_tuple!(T1, T2, T3);
impl_into_outputs_for_tuple!(T1, T2, T3, T4);
