// Implements a double-buffering system for the raw inputs of the control loop,
// ensuring the control tick only ever sees a complete set of samples.
// Hall levels are written by the timer interrupt, the throttle reading by the ADC DMA path;
// each lands in its own field of the buffer currently being filled.

// Key Features:
// - Two `DataInputs` buffers: one being filled, one complete and readable.
// - A bitmask tracks which mandatory fields of the filling buffer are still pending.
// - Buffers swap only once every mandatory field was written.
// - Reading copies the complete buffer out under a short lock bit.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Raw samples consumed by one control tick.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataInputs {
    /// Wheel hall level (true = magnet present).
    pub wheel_level: bool,

    /// Crank hall level (true = magnet present).
    pub crank_level: bool,

    /// Throttle ADC reading.
    pub throttle_adc: u16,
}

impl DataInputs {
    pub const ZERO: DataInputs = DataInputs {
        wheel_level: false,
        crank_level: false,
        throttle_adc: 0,
    };
}

/// Bit masks of each data field, plus the lock bit.
#[repr(u32)]
pub enum DataInputsBit {
    /// Both hall levels.
    HALL = 1 << 0,

    /// Throttle ADC reading.
    THROTTLE = 1 << 1,

    /// Lock bit at the most significant bit.
    LOCK = 1 << 31,
}

/// Two buffers of `DataInputs` and their fill flags.
pub struct InputsDump<const MANDATORY_FIELDS: u32> {
    /// One buffer being updated, one ready for reading.
    buffers: [DataInputs; 2],

    /// Index of the buffer currently being updated.
    idx2update: usize,

    /// Pending fields and lock status of each buffer.
    flags: [u32; 2],

    /// Completed buffer swaps.
    iter: usize,

    /// Swap count at the last read.
    prev_iter: usize,
}

impl<const MANDATORY_FIELDS: u32> InputsDump<MANDATORY_FIELDS> {
    /// Buffer 0 is pending, buffer 1 is readable (all zero: wheel and crank low, throttle closed).
    pub const fn new() -> Self {
        Self {
            buffers: [DataInputs::ZERO; 2],
            idx2update: 0,
            flags: [MANDATORY_FIELDS, 0],
            iter: 0,
            prev_iter: 0,
        }
    }

    #[inline(always)]
    fn is_ready(&self, idx: usize) -> bool {
        self.flags[idx] == 0
    }

    #[inline(always)]
    fn get_opposite(&self, idx: usize) -> usize {
        1 - idx
    }

    #[inline(always)]
    fn clear_field_bit(&mut self, idx: usize, bit: DataInputsBit) {
        self.flags[idx] &= !(bit as u32);
    }

    /// Once both buffers are complete, re-arm the older one for filling.
    fn check_fill(&mut self, idx: usize) {
        if self.is_ready(0) && self.is_ready(1) {
            let idx = self.get_opposite(idx);
            self.flags[idx] = MANDATORY_FIELDS;
            self.idx2update = idx;
            self.iter = self.iter.wrapping_add(1);
        }
    }

    /// Store both hall levels sampled in the same instant.
    pub fn set_hall(&mut self, wheel_level: bool, crank_level: bool) {
        let idx = self.idx2update;
        self.buffers[idx].wheel_level = wheel_level;
        self.buffers[idx].crank_level = crank_level;
        self.clear_field_bit(idx, DataInputsBit::HALL);
        self.check_fill(idx);
    }

    pub fn set_throttle_adc(&mut self, value: u16) {
        let idx = self.idx2update;
        self.buffers[idx].throttle_adc = value;
        self.clear_field_bit(idx, DataInputsBit::THROTTLE);
        self.check_fill(idx);
    }

    /// True when a new complete buffer arrived since the last read.
    #[inline(always)]
    pub fn is_updated(&self) -> bool {
        self.iter != self.prev_iter
    }

    /// Copy out the latest complete buffer.
    #[inline(always)]
    pub fn get_data(&mut self) -> DataInputs {
        let ready_idx = self.get_opposite(self.idx2update);
        self.flags[ready_idx] |= DataInputsBit::LOCK as u32;
        let data = self.buffers[ready_idx];
        self.prev_iter = self.iter;
        self.flags[ready_idx] &= !(DataInputsBit::LOCK as u32);
        data
    }
}

impl<const MANDATORY_FIELDS: u32> Default for InputsDump<MANDATORY_FIELDS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: u32 = DataInputsBit::HALL as u32 | DataInputsBit::THROTTLE as u32;

    #[test]
    fn test_partial_update_is_not_visible() {
        let mut dump = InputsDump::<ALL>::new();
        dump.set_hall(true, true);
        assert!(!dump.is_updated());
        assert_eq!(dump.get_data(), DataInputs::ZERO);
    }

    #[test]
    fn test_complete_update_swaps() {
        let mut dump = InputsDump::<ALL>::new();
        dump.set_hall(true, false);
        dump.set_throttle_adc(1234);
        assert!(dump.is_updated());

        let data = dump.get_data();
        assert_eq!(
            data,
            DataInputs {
                wheel_level: true,
                crank_level: false,
                throttle_adc: 1234
            }
        );
        assert!(!dump.is_updated());

        // Next set is filled in the other buffer while this one stays readable
        dump.set_throttle_adc(99);
        assert_eq!(dump.get_data().throttle_adc, 1234);
        dump.set_hall(false, true);
        assert_eq!(dump.get_data().throttle_adc, 99);
    }

    #[test]
    fn test_hall_only_mandatory() {
        let mut dump = InputsDump::<{ DataInputsBit::HALL as u32 }>::new();
        dump.set_throttle_adc(500);
        assert!(!dump.is_updated());
        dump.set_hall(false, true);
        assert!(dump.is_updated());
        let data = dump.get_data();
        assert!(data.crank_level);
        assert_eq!(data.throttle_adc, 500);
    }
}
