#![no_main]
#![no_std]

// Bench check of the hall sensor wiring: prints every detected edge with its timestamp
// and the wheel speed, and toggles the green LED on each crank rising edge.

use cortex_m::delay::Delay;
use cortex_m_rt::entry;
use hal::{clocks::Clocks, pac};
use panic_halt as _;

use rtt_target::{rprintln, rtt_init_print};

use pedelec_algo::{
    hall::{EdgeDetector, EdgeEvent},
    wheel::SpeedEstimator,
    AssistConfig, TickClock,
};
use pedelec_drivers::{hall::HallSensors, pinout};

#[entry]
fn main() -> ! {
    rtt_init_print!();
    rprintln!("Starting hall probe");

    let cp = cortex_m::Peripherals::take().unwrap();
    let _dp = pac::Peripherals::take().unwrap();

    let clock_cfg = Clocks::default();
    clock_cfg.setup().unwrap();
    let mut delay = Delay::new(cp.SYST, clock_cfg.systick());

    let config = AssistConfig::default();
    let halls = HallSensors::new();
    let mut led = pinout::led::GRN.init();
    led.set_high();

    let mut clock = TickClock::new(config.tick_period_ms);
    let mut wheel = EdgeDetector::new();
    let mut crank = EdgeDetector::new();
    let mut speed = SpeedEstimator::new(&config);

    loop {
        let now = clock.tick();
        let (wheel_level, crank_level) = halls.sample();

        let previous_edge = wheel.last_edge();
        let wheel_edge = wheel.tick(wheel_level, now);
        let stalled = wheel.is_stalled(now, config.stall_timeout_ms);
        let velocity = speed.tick(wheel_edge, previous_edge, stalled, now);
        if wheel_edge.is_rising() {
            rprintln!("{} wheel rpm:{} kmh:{}", now.as_millis(), speed.rpm(), velocity);
        }

        match crank.tick(crank_level, now) {
            EdgeEvent::Rising => {
                led.toggle();
                rprintln!("{} crank rising", now.as_millis());
            }
            EdgeEvent::Falling => rprintln!("{} crank falling", now.as_millis()),
            EdgeEvent::None => {}
        }

        delay.delay_ms(config.tick_period_ms);
    }
}
