//! # Order Tracking
//!
//! Live delivery tracking for orders: a view of one order's status that is
//! seeded from the order store and then kept current by pushed changes.
//!
//! ## Module Tour
//!
//! ### 1. The Tracker ([`tracker`])
//! [`OrderTracker`](tracker::OrderTracker) owns one [`OrderStatusView`](tracker::OrderStatusView).
//! `open` loads the snapshot and history, subscribes to live changes, and
//! `close` releases the subscriptions.
//!
//! ### 2. The Seams ([`backend`])
//! The tracker only knows the [`OrderStore`](backend::OrderStore) and
//! [`LiveFeed`](backend::LiveFeed) traits. Both are injected, so tests can
//! swap in fakes.
//!
//! ### 3. The In-Process Backend ([`framework`], [`order_actor`], [`clients`], [`realtime`])
//! - [`framework`] - generic resource actor and its mock client
//! - [`order_actor`] - the order entity, status recording rules, change announcements
//! - [`clients`] - [`OrderClient`](clients::OrderClient), the typed store client
//! - [`realtime`] - the change feed trackers subscribe to
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`OrderSystem`](lifecycle::OrderSystem) starts the backend, builds trackers,
//! and shuts everything down. [`setup_tracing`](lifecycle::setup_tracing)
//! configures logging from `RUST_LOG`.
//!
//! ### 5. The Data ([`model`])
//! Orders, status events, the delivery sequence, and parsing of raw change records.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod backend;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod realtime;
pub mod tracker;
