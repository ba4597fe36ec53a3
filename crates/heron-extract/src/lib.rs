//! # Heron Extract
//!
//! Parameter binding and output serialization for Heron handlers.
//!
//! ## Parameters
//!
//! Handler arguments implement [`FromDispatch`]:
//!
//! | Parameter | Bound to |
//! |-----------|----------|
//! | [`ResponseWriter`](heron_core::ResponseWriter) | the live response writer |
//! | [`RequestContext`](heron_core::RequestContext) | the per-request context |
//! | [`Request`](heron_core::Request) | the inbound request |
//! | [`Payload<T>`] | the request body, decoded by media type |
//! | [`Valid<T>`] | the request body, decoded then checked with [`Validate`] |
//!
//! ## Return values
//!
//! Handler return types implement [`IntoOutputs`]. See the [`output`]
//! module for the mapping from types to [`Output`]s.
//!
//! ## Example
//!
//! ```rust
//! use heron_core::{RequestContext, StatusError};
//! use heron_extract::{Json, Payload};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Deserialize)]
//! struct Rename {
//!     name: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Renamed {
//!     name: String,
//! }
//!
//! async fn rename(ctx: RequestContext, Payload(body): Payload<Rename>) -> Result<Json<Renamed>, StatusError> {
//!     if body.name.is_empty() {
//!         return Err(StatusError::BAD_REQUEST);
//!     }
//!     ctx.insert("renamed", body.name.clone());
//!     Ok(Json(Renamed { name: body.name }))
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/heron-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod error;
pub mod output;
mod payload;
mod validate;

pub use bind::{DispatchParts, FromDispatch, ParamRole};
pub use error::DispatchError;
pub use output::{IntoOutputs, Json, Output, ReturnShape, Template};
pub use payload::{carries_body, BodyFormat, Payload};
pub use validate::{Checker, Valid, Validate};
