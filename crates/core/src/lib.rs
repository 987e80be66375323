//! `quillpost-core`: shared identifiers and the domain error model.
//!
//! Nothing in here knows about HTTP, storage or authorization policy.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ArticleId, CommentId, UserId};
