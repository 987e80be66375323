//! `quillpost-auth`: role hierarchy and ownership-aware authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: it consumes a
//! resolved [`Principal`], a [`RoleRequirement`], an optional
//! [`OwnedResource`] and a [`RoleResolver`], and answers Allow or Deny.

pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod requirement;
pub mod resolver;
pub mod resource;
pub mod roles;

pub use authorize::{
    evaluate, AuthorizationReport, Authorizer, Decision, DenialKind, Grant, Verdict,
};
pub use catalog::{RoleCatalog, RoleDefinition};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use permissions::{permissions_of, Permission};
pub use principal::Principal;
pub use requirement::RoleRequirement;
pub use resolver::{RoleResolver, RoleResolverError};
pub use resource::OwnedResource;
pub use roles::{Role, UnknownRole};
