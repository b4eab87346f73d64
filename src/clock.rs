use std::{thread, time::Duration};

/// All protocol delays go through this seam so tests can drive the state
/// machines without real sleeps.
pub trait Clock {
    fn sleep_ms(&mut self, ms: u16);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sleep_ms(&mut self, ms: u16) {
        (**self).sleep_ms(ms)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep_ms(&mut self, ms: u16) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
