use crate::library::clock::interface::Clock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSystem;

impl ClockSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for ClockSystem {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
