#![no_main]
#![no_std]

use core::fmt::Write;

use panic_halt as _;

use cortex_m_rt::entry;
use cortex_m_semihosting::hio;
use stm32f4xx_hal::{pac, prelude::*};

use pulse_decode::{Instant, PulseCapture, MICROS_CALIBRATION};

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().expect("Failed to get device periph");

    let mut stdout = hio::hstdout().map_err(|_| core::fmt::Error).unwrap();

    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(168.MHz())
        .pclk1(42.MHz())
        .freeze();

    let gpiob = dp.GPIOB.split();
    let cmd_pin = gpiob.pb4.into_pull_down_input();

    // TIM5 is 32 bit, this wraps every 30 s and drops at most one pulse when
    // it does. Good enough for receiver checkout.
    let mut counter = dp.TIM5.counter_us(&clocks);
    counter.start(30.secs()).unwrap();

    writeln!(stdout, "watching PB4 for servo pulses").unwrap();

    let mut capture = PulseCapture::new();
    let mut last_level = cmd_pin.is_high();
    let mut pulses: u32 = 0;

    loop {
        let level = cmd_pin.is_high();
        if level == last_level {
            continue;
        }
        last_level = level;

        let now = Instant::from_ticks(counter.now().ticks() as u64);
        if let Some(width) = capture.edge(level, now) {
            pulses += 1;
            // semihosting is slow, don't print every frame
            if pulses % 25 == 0 {
                writeln!(
                    stdout,
                    "width: {} us -> {:?} (pulse {})",
                    width.ticks(),
                    MICROS_CALIBRATION.classify(width),
                    pulses
                )
                .unwrap();
            }
        }
    }
}
