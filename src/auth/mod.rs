//! Authentication module: session state, token validation, and access gating.
//!
//! This module provides:
//! - `Session`: owns the authenticated/unauthenticated lifecycle
//! - `CredentialStore`: durable single-slot persistence for the bearer token
//! - `RouteGuard`: role gating for protected views
//! - token decoding (`validate`, `decode_claims`) without signature checks
//!
//! The token is the only persisted artifact; identity is re-derived from it
//! on every load.

pub mod guard;
pub mod session;
pub mod store;
pub mod token;

pub use guard::{Access, NavIntent, RouteGuard};
pub use session::Session;
pub use store::CredentialStore;
pub use token::Role;
