//! labelpress HTTP adapter
//!
//! A thin local submission endpoint over `labelpress-core`: a structured
//! `{identifier, quantity}` payload is forwarded to the dispatch pipeline
//! and the resulting report is returned as JSON. History operations are
//! exposed alongside it so a browser automation script and the interactive
//! front end share identical semantics.
//!
//! Unauthenticated; binds loopback only. Same-machine trusted callers.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
