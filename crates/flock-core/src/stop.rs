use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// External abort request, polled once at the start of every tick.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

/// A stop signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn should_stop(&self) -> bool {
        false
    }
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for Arc<T> {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_stop_is_false() {
        assert!(!NeverStop.should_stop());
    }

    #[test]
    fn shared_flag_observed_through_arc() {
        let flag = Arc::new(AtomicBool::new(false));
        let signal = Arc::clone(&flag);
        assert!(!signal.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(signal.should_stop());
    }
}
