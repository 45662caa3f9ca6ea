use pulse_decode::{Instant, PulseCapture, PulseWidth};
use stm32f4xx_hal::gpio::{ExtiPin, Input, Pin};

pub type SpeedCmdPin = SpeedCmdInput<'B', 4>;

/// The speed-command input line plus the width measurement riding on it.
/// The pin is wired to an EXTI line triggering on both edges; the edge
/// handler samples the level and timestamps it here.
pub struct SpeedCmdInput<const P: char, const N: u8> {
    pin: Pin<P, N, Input>,
    capture: PulseCapture,
}

impl<const P: char, const N: u8> SpeedCmdInput<P, N> {
    pub fn new(pin: Pin<P, N, Input>) -> Self {
        Self {
            pin,
            capture: PulseCapture::new(),
        }
    }

    /// Call from the edge interrupt with the current instant. Reports the
    /// completed width when this edge was the falling end of a fully
    /// observed pulse.
    pub fn poll_edge(&mut self, now: Instant) -> Option<PulseWidth> {
        self.capture.edge(self.pin.is_high(), now)
    }

    pub fn clear_interrupt(&mut self) {
        self.pin.clear_interrupt_pending_bit();
    }
}
