//! Realtime change feed: notifications about inserted and updated rows.
//!
//! - [`ChangeEvent`] - one pushed notification with its raw record
//! - [`SubscriptionFilter`] - which notifications a subscriber wants
//! - [`RealtimeHub`] - in-process publisher and subscription registry
//! - [`SubscriptionHandle`] - owner-held registration, released with `unsubscribe`

pub mod change;
pub mod hub;

pub use change::*;
pub use hub::*;
