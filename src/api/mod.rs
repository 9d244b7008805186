//! REST API client module for the DockDineStay backend.
//!
//! All resource traffic goes through `ApiClient`, which attaches the bearer
//! token and classifies failures into `ApiError`. The router watches for
//! `ApiError::Unauthorized` to drive forced logout.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
