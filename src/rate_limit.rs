use std::thread;
use std::time::Duration;

use tracing::trace;

/// Pause policy applied between consecutive provider requests.
pub trait RateLimit {
    fn wait_before_next_call(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl RateLimit for FixedDelay {
    fn wait_before_next_call(&self) {
        if self.0.is_zero() {
            return;
        }
        trace!(delay_ms = self.0.as_millis() as u64, "throttling before next request");
        thread::sleep(self.0);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl RateLimit for NoDelay {
    fn wait_before_next_call(&self) {}
}

impl<R: RateLimit + ?Sized> RateLimit for &R {
    fn wait_before_next_call(&self) {
        (**self).wait_before_next_call();
    }
}
