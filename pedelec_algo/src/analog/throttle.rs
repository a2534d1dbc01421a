// Normalizes the raw throttle ADC reading to 0.0..=1.0.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub struct Throttle {
    full_scale: u16,  // ADC counts at full throttle
    value: f32,       // Last normalized value
    over_range: bool, // Last reading was above full scale
}

impl Throttle {
    pub fn new(full_scale: u16) -> Self {
        Self {
            full_scale: full_scale.max(1),
            value: 0.0,
            over_range: false,
        }
    }

    /// Convert one ADC sample. Readings above full scale clamp to 1.0.
    pub fn tick(&mut self, throttle_adc: u16) -> f32 {
        let over_range = throttle_adc > self.full_scale;
        if over_range && !self.over_range {
            warn!("THROTTLE: reading {} above full scale", throttle_adc);
        }
        self.over_range = over_range;
        self.value = throttle_adc.min(self.full_scale) as f32 / self.full_scale as f32;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let mut throttle = Throttle::new(4095);
        assert_eq!(throttle.tick(0), 0.0);
        assert_eq!(throttle.tick(4095), 1.0);
        assert!((throttle.tick(2048) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_over_range_clamps() {
        let mut throttle = Throttle::new(4095);
        assert_eq!(throttle.tick(u16::MAX), 1.0);
        assert_eq!(throttle.value(), 1.0);
    }
}
