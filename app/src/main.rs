#![no_main]
#![no_std]

use core::sync::atomic::{AtomicU32, Ordering};

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    adc::{Adc, AdcDevice, Align, InputType, SampleTime},
    clocks::Clocks,
    dma,
    dma::{Dma, DmaChannel, DmaInput, DmaInterrupt, DmaPeriph},
    gpio::Pin,
    pac,
    pac::{ADC1, DMA1},
};

use pedelec_algo::{
    inputs_dump::{DataInputsBit, InputsDump},
    AssistConfig, AssistMode, Clock, ControlLoop, MotorLimits, RateLimiter, Snapshot, Timestamp,
};

use pedelec_drivers::{
    current_output::CurrentOutput, hall::HallSensors, pinout, tick_timer::TickTimer,
    watchdog::IndependentWatchdog,
};

use cortex_m;

#[cfg(feature = "throttle-direct")]
const MODE: AssistMode = AssistMode::ThrottleDirect;
#[cfg(not(feature = "throttle-direct"))]
const MODE: AssistMode = AssistMode::PedalGated;

const CONFIG: AssistConfig = AssistConfig::with_mode(MODE);

/// Motor current limit of this drive
const MAX_CURRENT_A: f32 = 20.0;
/// Current commanded at full PWM duty
const CURRENT_FULL_SCALE_A: f32 = 40.0;
const CURRENT_PWM_FREQ: u16 = 20000;
/// Roughly 50 missed ticks before the MCU resets
const WATCHDOG_TIMEOUT_S: f32 = 0.1;

const MANDATORY_FIELDS: u32 = DataInputsBit::HALL as u32 | DataInputsBit::THROTTLE as u32;

const SAMPLING_COUNT: usize = 1;
const ADC1_SEQUENCE: [u8; SAMPLING_COUNT] = [pinout::throttle::THROTTLE_CH];

static mut ADC_READ_BUF: [u16; SAMPLING_COUNT] = [0; SAMPLING_COUNT];

/// Milliseconds since boot, advanced by the tick ISR
static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Time source of the control loop, backed by the tick counter.
pub struct MillisClock;

impl Clock for MillisClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(MILLIS.load(Ordering::Relaxed))
    }
}

/// Fixed motor configuration of this board.
pub struct BoardLimits {
    max_current_a: f32,
}

impl MotorLimits for BoardLimits {
    fn max_current_motor(&self) -> f32 {
        self.max_current_a
    }
}

type PedelecLoop = ControlLoop<MillisClock, BoardLimits, CurrentOutput, IndependentWatchdog>;

#[rtic::app(device = pac, peripherals = true, dispatchers = [TIM7, USART3])]
mod app {
    use super::*;

    #[shared]
    struct Shared {
        inputs: InputsDump<MANDATORY_FIELDS>,
    }

    #[local]
    struct Local {
        tick_timer: TickTimer,
        halls: HallSensors,
        adc1: Adc<ADC1>,
        dma1: Dma<DMA1>,
        control: PedelecLoop,
        limiter: RateLimiter,
        led: Pin,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        clock_cfg.setup().unwrap();

        let sysclk_freq = clock_cfg.sysclk();
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);
        defmt::info!("SYSTEM: assist mode {}", MODE);

        let mut led = pinout::led::GRN.init();
        led.set_high();

        let halls = HallSensors::new();
        pinout::throttle::THROTTLE.init();

        let mut current_output =
            CurrentOutput::new(dp.TIM2, &clock_cfg, CURRENT_PWM_FREQ, CURRENT_FULL_SCALE_A);
        current_output.begin();

        let dma1 = Dma::new(dp.DMA1);
        dma::enable_mux1();
        dma::mux(DmaPeriph::Dma1, DmaChannel::C1, DmaInput::Adc1);

        let mut adc1 = Adc::new_adc1(
            dp.ADC1,
            AdcDevice::One,
            Default::default(),
            clock_cfg.systick(),
        );

        for i in 0..SAMPLING_COUNT {
            adc1.set_sequence(ADC1_SEQUENCE[i], i as u8 + 1);
            adc1.set_input_type(ADC1_SEQUENCE[i], InputType::SingleEnded);
            adc1.set_sample_time(ADC1_SEQUENCE[i], SampleTime::T19);
        }
        adc1.set_sequence_len(SAMPLING_COUNT as u8);
        adc1.set_align(Align::Right);

        let watchdog = IndependentWatchdog::start(WATCHDOG_TIMEOUT_S);
        let limits = BoardLimits {
            max_current_a: MAX_CURRENT_A,
        };
        let control = ControlLoop::new(&CONFIG, MillisClock, limits, current_output, watchdog);

        // Last, so the first tick finds everything configured
        let tick_timer = TickTimer::new(dp.TIM3, &clock_cfg, CONFIG.tick_period_ms);

        (
            Shared {
                inputs: InputsDump::new(),
            },
            Local {
                tick_timer,
                halls,
                adc1,
                dma1,
                control,
                limiter: RateLimiter::new(CONFIG.diagnostics_period_ms),
                led,
            },
        )
    }

    #[task(binds = TIM3, priority = 3, shared = [inputs], local = [tick_timer, halls, adc1])]
    fn tim3_tick(mut cx: tim3_tick::Context) {
        cx.local.tick_timer.clear();
        MILLIS.fetch_add(CONFIG.tick_period_ms, Ordering::Relaxed);

        let (wheel, crank) = cx.local.halls.sample();
        // Conversion started on the previous tick
        let throttle_adc = unsafe { ADC_READ_BUF[0] };
        cx.shared.inputs.lock(|inputs| {
            inputs.set_hall(wheel, crank);
            inputs.set_throttle_adc(throttle_adc);
        });

        unsafe {
            cx.local.adc1.read_dma(
                &mut ADC_READ_BUF,
                &ADC1_SEQUENCE,
                DmaChannel::C1,
                Default::default(),
                DmaPeriph::Dma1,
            )
        };

        // Runs every tick; a missed spawn means the previous tick is still running
        if control_tick::spawn().is_err() {
            defmt::warn!("TICK: control tick overrun");
        }
    }

    #[task(priority = 2, shared = [inputs], local = [control, limiter])]
    async fn control_tick(mut cx: control_tick::Context) {
        let data = cx.shared.inputs.lock(|inputs| {
            if !inputs.is_updated() {
                defmt::debug!("TICK: inputs not refreshed, reusing last sample");
            }
            inputs.get_data()
        });

        let snapshot = cx.local.control.tick(data);

        if cx.local.limiter.ready(snapshot.timestamp) {
            log_snapshot::spawn(snapshot).ok();
        }
    }

    #[task(priority = 1, local = [led])]
    async fn log_snapshot(cx: log_snapshot::Context, snapshot: Snapshot) {
        // LED on (active low) while assisting
        if snapshot.is_pedaling {
            cx.local.led.set_low();
        } else {
            cx.local.led.set_high();
        }
        defmt::info!("{}", snapshot);
    }

    #[task(binds = DMA1_CH1, local = [dma1], priority = 1)]
    fn adc_end_read(cx: adc_end_read::Context) {
        dma::clear_interrupt(
            DmaPeriph::Dma1,
            DmaChannel::C1,
            DmaInterrupt::TransferComplete,
        );
        cx.local.dma1.stop(DmaChannel::C1);
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
