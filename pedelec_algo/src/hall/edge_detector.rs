// Implements debounced edge detection for a polled hall sensor channel.
//
// Key Features:
// - Pure latch transition `(latch, level) -> (latch, event)` usable without any timer
// - Exactly one rising edge per physical magnet pass, however many ticks the level stays high
// - Records the timestamp of each rising edge and reports stalled channels
//
// Detailed Operation:
// The sensor is sampled once per tick. A rising edge fires only while the latch is clear;
// firing sets the latch. The latch is cleared by the first low sample, which is reported as
// a falling edge (without touching the edge timestamp) and arms the next rising edge.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::time::Timestamp;

/// Result of feeding one level sample into the latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeEvent {
    Rising,
    Falling,
    None,
}

impl EdgeEvent {
    #[inline(always)]
    pub fn is_rising(self) -> bool {
        self == EdgeEvent::Rising
    }
}

/// Trigger latch of one channel. Set while the sensor is known to be high.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeLatch {
    triggered: bool,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self { triggered: false }
    }

    /// Latch transition for one level sample.
    pub const fn step(self, level: bool) -> (EdgeLatch, EdgeEvent) {
        match (self.triggered, level) {
            (false, true) => (EdgeLatch { triggered: true }, EdgeEvent::Rising),
            (true, false) => (EdgeLatch { triggered: false }, EdgeEvent::Falling),
            _ => (self, EdgeEvent::None),
        }
    }

    pub const fn is_triggered(self) -> bool {
        self.triggered
    }
}

/// Per-channel edge detector holding the latch and the last rising edge time.
pub struct EdgeDetector {
    latch: EdgeLatch,
    last_edge: Option<Timestamp>, // None until the first rising edge after boot
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self {
            latch: EdgeLatch::new(),
            last_edge: None,
        }
    }

    /// Feed the level sampled at `now`.
    pub fn tick(&mut self, level: bool, now: Timestamp) -> EdgeEvent {
        let (latch, event) = self.latch.step(level);
        self.latch = latch;
        if event.is_rising() {
            self.last_edge = Some(now);
        }
        event
    }

    /// Latched logical level.
    pub fn level(&self) -> bool {
        self.latch.is_triggered()
    }

    pub fn last_edge(&self) -> Option<Timestamp> {
        self.last_edge
    }

    /// True when the channel reads low and no rising edge was seen for longer than `timeout_ms`.
    /// A channel that never produced an edge is not reported as stalled.
    pub fn is_stalled(&self, now: Timestamp, timeout_ms: u32) -> bool {
        match self.last_edge {
            Some(edge) => !self.level() && now.elapsed_since(edge) > timeout_ms,
            None => false,
        }
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_transitions() {
        let latch = EdgeLatch::new();
        let (latch, event) = latch.step(true);
        assert_eq!(event, EdgeEvent::Rising);
        let (latch, event) = latch.step(true);
        assert_eq!(event, EdgeEvent::None);
        let (latch, event) = latch.step(false);
        assert_eq!(event, EdgeEvent::Falling);
        let (_, event) = latch.step(false);
        assert_eq!(event, EdgeEvent::None);
    }

    #[test]
    fn test_held_high_fires_once() {
        for held_ticks in 2..50u32 {
            let mut detector = EdgeDetector::new();
            let rising = (0..held_ticks)
                .map(|t| detector.tick(true, Timestamp::from_millis(t * 2)))
                .filter(|e| e.is_rising())
                .count();
            assert_eq!(rising, 1, "held for {} ticks", held_ticks);
        }
    }

    #[test]
    fn test_rising_records_timestamp_falling_does_not() {
        let mut detector = EdgeDetector::new();
        detector.tick(false, Timestamp::from_millis(0));
        assert_eq!(detector.last_edge(), None);

        detector.tick(true, Timestamp::from_millis(10));
        assert_eq!(detector.last_edge(), Some(Timestamp::from_millis(10)));

        assert_eq!(detector.tick(false, Timestamp::from_millis(20)), EdgeEvent::Falling);
        assert_eq!(detector.last_edge(), Some(Timestamp::from_millis(10)));

        assert_eq!(detector.tick(true, Timestamp::from_millis(30)), EdgeEvent::Rising);
        assert_eq!(detector.last_edge(), Some(Timestamp::from_millis(30)));
    }

    #[test]
    fn test_stall_only_while_low() {
        let mut detector = EdgeDetector::new();
        assert!(!detector.is_stalled(Timestamp::from_millis(10_000), 3000));

        detector.tick(true, Timestamp::from_millis(100));
        // Magnet parked in front of the sensor
        assert!(!detector.is_stalled(Timestamp::from_millis(5000), 3000));

        detector.tick(false, Timestamp::from_millis(200));
        assert!(!detector.is_stalled(Timestamp::from_millis(3100), 3000));
        assert!(detector.is_stalled(Timestamp::from_millis(3101), 3000));
    }
}
