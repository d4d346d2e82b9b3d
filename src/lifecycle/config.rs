/// Sizing of the in-process backend.
///
/// Log verbosity is not part of this struct; it comes from `RUST_LOG`
/// (see [`setup_tracing`](crate::lifecycle::setup_tracing)).
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    /// Requests the order actor queues before senders wait.
    pub actor_buffer: usize,
    /// Notifications a change-feed subscriber may fall behind before it
    /// starts missing pushes.
    pub feed_capacity: usize,
    /// Number of the first generated order id (`ORD-<n>`).
    pub first_order_number: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            actor_buffer: 32,
            feed_capacity: 256,
            first_order_number: 1001,
        }
    }
}

impl SystemConfig {
    pub fn with_first_order_number(mut self, n: u64) -> Self {
        self.first_order_number = n;
        self
    }

    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }
}
