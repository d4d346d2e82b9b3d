//! Pure data structures: orders, status events, and change-feed records.

pub mod event;
pub mod order;
pub mod payload;
pub mod status;

pub use event::*;
pub use order::*;
pub use payload::*;
pub use status::*;
