#![cfg_attr(not(test), no_std)]

//! Decoding for a single R/C pulse-position channel: measure the high time of
//! the speed-command line, classify it against a neutral dead-band, and scale
//! it into a duty-cycled motor command. No hardware types in here, everything
//! runs against plain tick counts so it can be tested on the host.

use fugit::TimerInstantU64;

/// Microsecond instants from the free-running monotonic.
pub type Instant = TimerInstantU64<1_000_000>;

/// 1 MHz tick calibration for a standard hobby R/C channel: 1.5 ms neutral,
/// ±16 us dead-band, full speed at 1 ms / 2 ms.
pub const MICROS_CALIBRATION: Calibration = Calibration::new(1500, 16, 500);

/// Elapsed ticks between the rising and the falling edge of one pulse.
///
/// Only the most recent measurement is ever meaningful; a new pulse replaces
/// the old one. Pulses longer than `u16::MAX` ticks saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PulseWidth(u16);

impl PulseWidth {
    pub const MAX: Self = Self(u16::MAX);

    pub const fn from_ticks(ticks: u16) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> u16 {
        self.0
    }
}

/// Rotation state decoded from one pulse. `Zero` is the power-on default so
/// the motor stays parked until a valid pulse shows up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Zero,
    Clockwise,
    CounterClockwise,
}

/// What the output stage should do: which bridge input carries PWM and at
/// what duty ratio (0.0 ..= 1.0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MotorCommand {
    #[default]
    Zero,
    Clockwise(f32),
    CounterClockwise(f32),
}

impl MotorCommand {
    pub fn direction(&self) -> Direction {
        match self {
            MotorCommand::Zero => Direction::Zero,
            MotorCommand::Clockwise(_) => Direction::Clockwise,
            MotorCommand::CounterClockwise(_) => Direction::CounterClockwise,
        }
    }
}

/// Channel calibration in timer ticks: the neutral midpoint, the half-width
/// of the zero dead-band around it, and the span from neutral out to either
/// full-speed extreme.
///
/// The dead-band soaks up measurement jitter around neutral so the motor
/// doesn't twitch when the stick is centered. It is symmetric around the
/// midpoint by construction; widen it to taste but keep it narrower than the
/// full-scale span. All three values are tied to the tick rate of the clock
/// doing the measuring, so a port to a different timer setup re-derives them
/// from the tick-to-microsecond ratio instead of reusing the literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    neutral: u16,
    dead_band: u16,
    full_scale: u16,
}

impl Calibration {
    pub const fn new(neutral: u16, dead_band: u16, full_scale: u16) -> Self {
        assert!(dead_band > 0);
        assert!(dead_band < full_scale);
        assert!(full_scale < neutral);
        Self {
            neutral,
            dead_band,
            full_scale,
        }
    }

    /// Widths strictly below this decode as counter-clockwise.
    pub const fn zero_low(&self) -> u16 {
        self.neutral - self.dead_band
    }

    /// Widths strictly above this decode as clockwise.
    pub const fn zero_high(&self) -> u16 {
        self.neutral + self.dead_band
    }

    /// Three-way hysteresis thresholding, band edges inclusive. Pure function
    /// of the width and the calibration, nothing else.
    pub const fn classify(&self, width: PulseWidth) -> Direction {
        let w = width.ticks();
        if w < self.zero_low() {
            Direction::CounterClockwise
        } else if w > self.zero_high() {
            Direction::Clockwise
        } else {
            Direction::Zero
        }
    }

    /// Whether a width sits inside the expected full-scale envelope. Anything
    /// outside still decodes (clamped to full duty), but callers may want to
    /// count it as a glitch.
    pub const fn in_range(&self, width: PulseWidth) -> bool {
        let w = width.ticks();
        w >= self.neutral.saturating_sub(self.full_scale)
            && w <= self.neutral.saturating_add(self.full_scale)
    }

    /// Full decode: classify, then scale the deviation from neutral into a
    /// duty ratio. Widths past the full-scale extremes (including saturated
    /// over-long pulses) clamp to full duty in the detected direction.
    pub fn decode(&self, width: PulseWidth) -> MotorCommand {
        let w = width.ticks();
        match self.classify(width) {
            Direction::Zero => MotorCommand::Zero,
            Direction::Clockwise => MotorCommand::Clockwise(self.duty(w - self.neutral)),
            Direction::CounterClockwise => {
                MotorCommand::CounterClockwise(self.duty(self.neutral - w))
            }
        }
    }

    fn duty(&self, deviation: u16) -> f32 {
        (deviation as f32 / self.full_scale as f32).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
enum CaptureState {
    Idle,
    Timing(Instant),
}

/// Edge-to-edge width measurement against a free-running microsecond clock.
///
/// Feed it the sampled line level at every edge interrupt. A rising edge arms
/// (or re-arms) the measurement, the next falling edge completes it. A
/// falling edge with no rise on record reports nothing, so a missed edge can
/// never produce a bogus zero-width pulse. Widths longer than `u16::MAX`
/// ticks are ambiguous and report as `PulseWidth::MAX`.
#[derive(Debug)]
pub struct PulseCapture {
    state: CaptureState,
}

impl PulseCapture {
    pub const fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Call on every edge with the level read from the pin and the current
    /// instant. Returns the completed width on the falling edge of a fully
    /// observed pulse, `None` otherwise.
    pub fn edge(&mut self, level_high: bool, now: Instant) -> Option<PulseWidth> {
        if level_high {
            self.state = CaptureState::Timing(now);
            return None;
        }

        match self.state {
            CaptureState::Timing(rose_at) => {
                self.state = CaptureState::Idle;
                now.checked_duration_since(rose_at)
                    .map(|d| PulseWidth::from_ticks(d.ticks().min(u16::MAX as u64) as u16))
            }
            CaptureState::Idle => None,
        }
    }
}

impl Default for PulseCapture {
    fn default() -> Self {
        Self::new()
    }
}
