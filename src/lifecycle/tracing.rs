//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `fmt` subscriber filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: Startup, shutdown, and final store size
//! - **Order Operations**: Create, Get, Update, and status Actions
//! - **Change Feed**: Subscriptions added and removed, lagging subscribers
//! - **Trackers**: Open, ready, close, and every swallowed live-update failure
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and status changes
//! RUST_LOG=info cargo run
//!
//! # Every request, publish and received event
//! RUST_LOG=debug cargo run
//!
//! # Only the tracker
//! RUST_LOG=order_tracking::tracker=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a tracked delivery reads roughly:
//!
//! ```text
//! INFO Actor started entity_type="OrderRecord"
//! INFO Created entity_type="OrderRecord" id=ORD-1001 size=1
//! INFO open: Subscribed subscription=1 filter=status_events/insert order_id=ORD-1001
//! INFO open: Tracker ready current_status=Some(Processing) events=1
//! INFO Action ok entity_type="OrderRecord" id=ORD-1001
//! INFO Tracker closed order_id=Some(OrderId("ORD-1001"))
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
