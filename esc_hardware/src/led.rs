use stm32f4xx_hal::gpio::{Output, PushPull, PD12, PD13, PD14, PD15};

/// Lit at the end of init, once the driver enable line is up.
pub type EnableLed = PD12<Output<PushPull>>;
/// Lit while the last measured pulse was outside the 1-2 ms envelope.
pub type RangeLed = PD13<Output<PushPull>>;
/// Lit while the failsafe holds the motor at zero or the driver reports a fault.
pub type FaultLed = PD14<Output<PushPull>>;
/// Heartbeat blinker.
pub type HeartbeatLed = PD15<Output<PushPull>>;
