use stm32f4xx_hal::{pac::TIM4, timer::PwmChannel};

/// TIM4 CH1 on PB6, bridge IN1. Carries duty for clockwise rotation.
pub type CwChannel = PwmChannel<TIM4, 0>;
/// TIM4 CH2 on PB7, bridge IN2. Carries duty for counter-clockwise rotation.
pub type CcwChannel = PwmChannel<TIM4, 1>;
