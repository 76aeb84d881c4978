//! Domain extensions
//!
//! Optional producers that plug into the engine through its two extension
//! seams: [`Depicter`](crate::builder::Depicter) implementations claim
//! resources before default node creation, and
//! [`Filterer`](crate::filters::Filterer) callbacks contribute collapse
//! semantics for their own node types.
//!
//! Extensions are wired in by the caller at composition time: assembling
//! the ordered depicter and filterer lists is the composition root's job,
//! not a side effect of linking a module.

pub mod operator;
pub mod serverless;

pub use operator::{operator_filterer, EXPAND_OPERATOR_GROUPS_FILTER_ID};
pub use serverless::{is_serverless_backed, is_serverless_resource, ServerlessDepicter};
