//! Clock injection seam.
//!
//! The core never reads device time directly; everything flows through a
//! [`Clock`] so calculations can be driven by fixed instants in tests.

use chrono::{Local, NaiveDateTime};
use std::sync::Mutex;

/// Provider of the device-local "now" instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The real device clock, in local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for deterministic tests (and for simulating clock skew).
pub struct FixedClock {
    instant: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(instant: NaiveDateTime) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: NaiveDateTime) {
        *self.instant.lock().expect("clock poisoned") = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.instant.lock().expect("clock poisoned")
    }
}
