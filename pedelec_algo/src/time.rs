// Millisecond timestamps and the clock port used by every state machine of the crate.
//
// Timestamps are plain u32 milliseconds since boot and wrap after ~49 days.
// All comparisons go through `elapsed_since`, which uses wrapping subtraction,
// so a wrap never produces a negative or panicking interval.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Monotonic millisecond timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u32);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` up to `self`.
    #[inline(always)]
    pub const fn elapsed_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    #[inline(always)]
    pub const fn add_millis(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }
}

/// Source of the current time for the control loop.
pub trait Clock {
    fn now(&self) -> Timestamp;

    fn elapsed_since(&self, earlier: Timestamp) -> u32 {
        self.now().elapsed_since(earlier)
    }
}

/// Clock advanced explicitly by a periodic caller, one fixed period per tick.
pub struct TickClock {
    now: Timestamp,    // Time of the latest tick
    period_ms: u32,    // Tick period
}

impl TickClock {
    pub fn new(period_ms: u32) -> Self {
        Self {
            now: Timestamp::ZERO,
            period_ms,
        }
    }

    /// Advance by one period and return the new time.
    pub fn tick(&mut self) -> Timestamp {
        self.now = self.now.add_millis(self.period_ms);
        self.now
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }
}

impl Clock for TickClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}
