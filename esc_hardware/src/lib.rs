#![no_std]

use stm32f4xx_hal::{
    gpio::Edge,
    pac::Peripherals,
    prelude::*,
    timer::{Channel1, Channel2, Timer4},
};

pub mod led;
pub mod motors;
pub mod pulse_input;
pub mod pwm;

use led::{EnableLed, FaultLed, HeartbeatLed, RangeLed};
use motors::mc33886::{DriveMotor, MotorDriver};
use pulse_input::{SpeedCmdInput, SpeedCmdPin};

/// TIM2/TIM4 hang off APB1; with PCLK1 at 42 MHz the timer clock doubles
/// to 84 MHz. Anyone touching the clock tree below has to keep this in sync.
pub const TIM2_CLOCK_HZ: u32 = 84_000_000;

pub struct EscHardware {
    pub enable_led: EnableLed,
    pub range_led: RangeLed,
    pub fault_led: FaultLed,
    pub heartbeat_led: HeartbeatLed,

    pub speed_cmd: SpeedCmdPin,
    pub motor: DriveMotor,
}

impl EscHardware {
    pub fn init(mut pac: Peripherals) -> Self {
        let mut syscfg = pac.SYSCFG.constrain();

        let rcc = pac.RCC.constrain();
        let clocks = rcc
            .cfgr
            .use_hse(8.MHz())
            .sysclk(168.MHz())
            .pclk1(42.MHz())
            .freeze();

        let gpiob = pac.GPIOB.split();
        let gpiod = pac.GPIOD.split();

        // Status LED's
        let enable_led = gpiod.pd12.into_push_pull_output();
        let range_led = gpiod.pd13.into_push_pull_output();
        let fault_led = gpiod.pd14.into_push_pull_output();
        let heartbeat_led = gpiod.pd15.into_push_pull_output();

        // Speed command input. The receiver idles the line low between
        // pulses, the pull keeps it there when the lead is unplugged.
        let mut cmd_pin = gpiob.pb4.into_pull_down_input();
        cmd_pin.make_interrupt_source(&mut syscfg);
        cmd_pin.enable_interrupt(&mut pac.EXTI);
        cmd_pin.trigger_on_edge(&mut pac.EXTI, Edge::RisingFalling);
        let speed_cmd = SpeedCmdInput::new(cmd_pin);

        // MC33886 tops out at 10 kHz PWM
        let tim4 = Timer4::new(pac.TIM4, &clocks);
        let tim4_pins = (Channel1::new(gpiob.pb6), Channel2::new(gpiob.pb7));
        let (mut cw_pwm, mut ccw_pwm) = tim4.pwm_hz(tim4_pins, 10.kHz()).split();
        cw_pwm.enable();
        ccw_pwm.enable();

        let enable_pin = gpiob.pb12.into_push_pull_output();
        let fault_pin = gpiob.pb5.into_pull_up_input();
        // PWM error type is Infallible on these channels
        let motor = MotorDriver::new(cw_pwm, ccw_pwm, enable_pin, fault_pin).unwrap();

        Self {
            enable_led,
            range_led,
            fault_led,
            heartbeat_led,
            speed_cmd,
            motor,
        }
    }
}
