//! Runtime orchestration and lifecycle management.
//!
//! - [`OrderSystem`] - starts the change feed and the order actor and wires them together
//! - [`SystemConfig`] - sizing knobs for the runtime
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod config;
pub mod order_system;
pub mod tracing;

pub use config::*;
pub use order_system::*;
pub use self::tracing::*;
