// Driver for the MC33886 5 A single H-bridge

use crate::motors::{hbridge::HBridge, OpenLoopDrive};
use crate::pwm::{CcwChannel, CwChannel};

use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::pwm::SetDutyCycle;
use pulse_decode::MotorCommand;
use stm32f4xx_hal::gpio::{Input, Output, Pin, PushPull};

pub type DriveMotor =
    MotorDriver<CwChannel, CcwChannel, Pin<'B', 12, Output<PushPull>>, Pin<'B', 5, Input>>;

pub struct MotorDriver<P1, P2, E, F>
where
    P1: SetDutyCycle,
    P2: SetDutyCycle<Error = P1::Error>,
    E: StatefulOutputPin,
    F: InputPin,
{
    bridge: HBridge<P1, P2>,
    enable: E,
    // FS is open drain, pulled low by the chip on under-voltage, over-current
    // or over-temperature shutdown
    fault: F,
}

impl<P1, P2, E, F> MotorDriver<P1, P2, E, F>
where
    P1: SetDutyCycle,
    P2: SetDutyCycle<Error = P1::Error>,
    E: StatefulOutputPin,
    F: InputPin,
{
    /// Bridge inputs are parked at zero duty; the enable line is left where
    /// the caller set it, assert it with [`set_enable`](Self::set_enable)
    /// once the rest of bring-up is done.
    pub fn new(input_1: P1, input_2: P2, enable: E, fault: F) -> Result<Self, P1::Error> {
        Ok(Self {
            bridge: HBridge::new(input_1, input_2)?,
            enable,
            fault,
        })
    }

    pub fn set_enable(&mut self, enabled: bool) {
        if enabled {
            self.enable.set_high().ok();
        } else {
            self.enable.set_low().ok();
        }
    }

    pub fn is_enabled(&mut self) -> bool {
        self.enable.is_set_high().unwrap_or(false)
    }

    /// True while the chip holds FS low. A line that cannot be read reports
    /// as faulted.
    pub fn is_faulted(&mut self) -> bool {
        self.fault.is_low().unwrap_or(true)
    }
}

impl<P1, P2, E, F> OpenLoopDrive for MotorDriver<P1, P2, E, F>
where
    P1: SetDutyCycle,
    P2: SetDutyCycle<Error = P1::Error>,
    E: StatefulOutputPin,
    F: InputPin,
{
    type Error = P1::Error;

    /// While FS is latched low the command is discarded and the bridge parks
    /// at zero duty; the chip gates its outputs until the fault clears.
    fn drive(&mut self, command: MotorCommand) -> Result<(), Self::Error> {
        if self.is_faulted() {
            return self.bridge.run(MotorCommand::Zero);
        }
        self.bridge.run(command)
    }

    fn current_command(&self) -> MotorCommand {
        self.bridge.current_command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::Cell;
    use core::convert::Infallible;

    // The driver owns its pins; the tests watch duty and the FS level
    // through `Cell` handles.
    struct MockPwm<'a> {
        duty: &'a Cell<u16>,
    }

    impl embedded_hal::pwm::ErrorType for MockPwm<'_> {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm<'_> {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty.set(duty);
            Ok(())
        }
    }

    struct MockEnable {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for MockEnable {
        type Error = Infallible;
    }

    impl OutputPin for MockEnable {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for MockEnable {
        fn is_set_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_set_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    struct MockFault<'a> {
        low: &'a Cell<bool>,
    }

    impl embedded_hal::digital::ErrorType for MockFault<'_> {
        type Error = Infallible;
    }

    impl InputPin for MockFault<'_> {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low.get())
        }
    }

    fn driver<'a>(
        in1: &'a Cell<u16>,
        in2: &'a Cell<u16>,
        fs: &'a Cell<bool>,
    ) -> MotorDriver<MockPwm<'a>, MockPwm<'a>, MockEnable, MockFault<'a>> {
        MotorDriver::new(
            MockPwm { duty: in1 },
            MockPwm { duty: in2 },
            MockEnable { high: false },
            MockFault { low: fs },
        )
        .unwrap()
    }

    #[test]
    fn fault_parks_the_bridge() {
        let (in1, in2) = (Cell::new(0), Cell::new(0));
        let fs = Cell::new(false);
        let mut motor = driver(&in1, &in2, &fs);

        motor.drive(MotorCommand::Clockwise(0.5)).unwrap();
        assert_eq!(in1.get(), 500);

        fs.set(true);
        motor.drive(MotorCommand::Clockwise(0.8)).unwrap();
        assert_eq!(in1.get(), 0);
        assert_eq!(in2.get(), 0);
        assert_eq!(motor.current_command(), MotorCommand::Zero);
    }

    #[test]
    fn clearing_the_fault_resumes_drive() {
        let (in1, in2) = (Cell::new(0), Cell::new(0));
        let fs = Cell::new(true);
        let mut motor = driver(&in1, &in2, &fs);

        motor.drive(MotorCommand::CounterClockwise(0.6)).unwrap();
        assert_eq!(motor.current_command(), MotorCommand::Zero);

        fs.set(false);
        motor.drive(MotorCommand::CounterClockwise(0.6)).unwrap();
        assert_eq!(in2.get(), 600);
        assert_eq!(motor.current_command(), MotorCommand::CounterClockwise(0.6));
    }

    #[test]
    fn driving_again_applies_the_newest_command() {
        let (in1, in2) = (Cell::new(0), Cell::new(0));
        let fs = Cell::new(false);
        let mut motor = driver(&in1, &in2, &fs);

        motor.drive(MotorCommand::Clockwise(0.3)).unwrap();
        motor.drive(MotorCommand::Clockwise(0.8)).unwrap();
        assert_eq!(in1.get(), 800);
        assert_eq!(in2.get(), 0);
        assert_eq!(motor.current_command(), MotorCommand::Clockwise(0.8));
    }

    #[test]
    fn enable_follows_the_pin() {
        let (in1, in2) = (Cell::new(0), Cell::new(0));
        let fs = Cell::new(false);
        let mut motor = driver(&in1, &in2, &fs);

        assert!(!motor.is_enabled());
        motor.set_enable(true);
        assert!(motor.is_enabled());
        motor.set_enable(false);
        assert!(!motor.is_enabled());
    }
}
