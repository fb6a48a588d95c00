//! Environment client: a typed facade over the building simulator API.
//!
//! The [`EnvironmentApi`] trait is the seam the agent runtime is written
//! against; [`HttpEnvironmentClient`] is the production implementation.
//! Every operation degrades to a neutral "unavailable" result instead of
//! propagating transport errors across the component boundary.

pub mod api;
pub mod http;

pub use api::EnvironmentApi;
pub use http::{ClientConfig, ClientError, HttpEnvironmentClient};
