#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt::{info, warn};
use defmt_rtt as _;
use panic_halt as _;
use stm32f4xx_hal::{
    pac,
    prelude::*,
    timer::{Channel1, Channel2, Timer4},
};

use esc_hardware::motors::{mc33886::MotorDriver, OpenLoopDrive};
use pulse_decode::MotorCommand;

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().expect("Failed to get device periph");
    let cp = cortex_m::peripheral::Peripherals::take().expect("Failed to get core periph");

    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(168.MHz())
        .pclk1(42.MHz())
        .freeze();

    let mut delay = cp.SYST.delay(&clocks);

    let gpiob = dp.GPIOB.split();

    let tim4 = Timer4::new(dp.TIM4, &clocks);
    let tim4_pins = (Channel1::new(gpiob.pb6), Channel2::new(gpiob.pb7));
    let (mut cw_pwm, mut ccw_pwm) = tim4.pwm_hz(tim4_pins, 10.kHz()).split();
    cw_pwm.enable();
    ccw_pwm.enable();

    let enable_pin = gpiob.pb12.into_push_pull_output();
    let fault_pin = gpiob.pb5.into_pull_up_input();
    let mut motor = MotorDriver::new(cw_pwm, ccw_pwm, enable_pin, fault_pin).unwrap();

    motor.set_enable(true);
    info!("sweeping both directions in 10% steps");

    loop {
        for step in 0..=10u32 {
            let duty = step as f32 / 10.0;
            motor.drive(MotorCommand::Clockwise(duty)).unwrap();
            info!("cw duty: {}", duty);
            delay.delay_ms(500_u32);
        }
        motor.drive(MotorCommand::Zero).unwrap();
        delay.delay_ms(1000_u32);

        for step in 0..=10u32 {
            let duty = step as f32 / 10.0;
            motor.drive(MotorCommand::CounterClockwise(duty)).unwrap();
            info!("ccw duty: {}", duty);
            delay.delay_ms(500_u32);
        }
        motor.drive(MotorCommand::Zero).unwrap();

        if motor.is_faulted() {
            warn!("driver pulled FS low during the sweep");
        }
        delay.delay_ms(1000_u32);
    }
}
