// Board support for the pedal assist controller: pin map, hall inputs,
// motor current output, tick timer and independent watchdog.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![no_std]

pub mod current_output;
pub mod hall;
pub mod pinout;
pub mod tick_timer;
pub mod watchdog;
