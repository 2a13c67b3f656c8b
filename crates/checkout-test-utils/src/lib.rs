//! Shared test utilities for the checkout-reconciler workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`gateway`] — [`FakeGateway`], an in-memory version-control server
//! - [`workspace`] — [`TestWorkspace`], a temp-dir workspace fixture

pub mod gateway;
pub mod workspace;

pub use gateway::{FakeGateway, GatewayCall, LocalMirror};
pub use workspace::TestWorkspace;
