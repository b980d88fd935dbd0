//! Stand-in for the device manifest and both release backends.
//!
//! Serves the same paths and payload shapes as the real upstreams so the
//! exporter can be pointed at it for local runs and integration tests.

pub mod fixture;
pub mod server;

pub use fixture::UpstreamFixture;
pub use server::{upstream_router, MockUpstream};
