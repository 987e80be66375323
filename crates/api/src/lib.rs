//! HTTP API: configuration, principal resolution, endpoint guards and routes.

pub mod app;
pub mod config;
pub mod context;
pub mod guard;
pub mod middleware;
pub mod tokens;
