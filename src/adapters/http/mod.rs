//! HTTP adapters - axum routers and handlers.

pub mod billing;
