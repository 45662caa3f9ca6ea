use embedded_hal::pwm::SetDutyCycle;
use pulse_decode::MotorCommand;

/// A dual-input H-bridge driven by two PWM channels. IN1 carries duty for
/// clockwise rotation, IN2 for counter-clockwise, never both at once; zero
/// duty on both lets the motor coast.
pub struct HBridge<P1, P2> {
    input_1: P1,
    input_2: P2,
    current: MotorCommand,
}

impl<P1, P2> HBridge<P1, P2>
where
    P1: SetDutyCycle,
    P2: SetDutyCycle<Error = P1::Error>,
{
    /// Parks both inputs at zero duty before handing the bridge back.
    pub fn new(input_1: P1, input_2: P2) -> Result<Self, P1::Error> {
        let mut bridge = Self {
            input_1,
            input_2,
            current: MotorCommand::Zero,
        };
        bridge.run(MotorCommand::Zero)?;
        Ok(bridge)
    }

    pub fn run(&mut self, command: MotorCommand) -> Result<(), P1::Error> {
        let max_1 = self.input_1.max_duty_cycle();
        let max_2 = self.input_2.max_duty_cycle();
        let (in1_duty, in2_duty) = match command {
            MotorCommand::Clockwise(d) => {
                let duty_ratio = d.clamp(0.0, 1.0);
                ((max_1 as f32 * duty_ratio) as u16, 0)
            }
            MotorCommand::CounterClockwise(d) => {
                let duty_ratio = d.clamp(0.0, 1.0);
                (0, (max_2 as f32 * duty_ratio) as u16)
            }
            MotorCommand::Zero => (0, 0),
        };

        self.input_1.set_duty_cycle(in1_duty)?;
        self.input_2.set_duty_cycle(in2_duty)?;
        self.current = command;
        Ok(())
    }

    pub fn current_command(&self) -> MotorCommand {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    struct MockPwm {
        duty: u16,
    }

    impl MockPwm {
        fn new() -> Self {
            Self { duty: 0 }
        }
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn new_bridge_is_parked() {
        let bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        assert_eq!(bridge.input_1.duty, 0);
        assert_eq!(bridge.input_2.duty, 0);
        assert_eq!(bridge.current_command(), MotorCommand::Zero);
    }

    #[test]
    fn clockwise_drives_in1_only() {
        let mut bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        bridge.run(MotorCommand::Clockwise(0.5)).unwrap();
        assert_eq!(bridge.input_1.duty, 500);
        assert_eq!(bridge.input_2.duty, 0);
    }

    #[test]
    fn counter_clockwise_drives_in2_only() {
        let mut bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        bridge.run(MotorCommand::CounterClockwise(0.25)).unwrap();
        assert_eq!(bridge.input_1.duty, 0);
        assert_eq!(bridge.input_2.duty, 250);
    }

    #[test]
    fn zero_parks_both_inputs() {
        let mut bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        bridge.run(MotorCommand::Clockwise(1.0)).unwrap();
        bridge.run(MotorCommand::Zero).unwrap();
        assert_eq!(bridge.input_1.duty, 0);
        assert_eq!(bridge.input_2.duty, 0);
    }

    #[test]
    fn duty_is_clamped_to_unity() {
        let mut bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        bridge.run(MotorCommand::Clockwise(3.5)).unwrap();
        assert_eq!(bridge.input_1.duty, 1000);

        bridge.run(MotorCommand::CounterClockwise(-1.0)).unwrap();
        assert_eq!(bridge.input_1.duty, 0);
        assert_eq!(bridge.input_2.duty, 0);
    }

    #[test]
    fn switching_direction_releases_the_other_input() {
        let mut bridge = HBridge::new(MockPwm::new(), MockPwm::new()).unwrap();
        bridge.run(MotorCommand::Clockwise(0.8)).unwrap();
        bridge.run(MotorCommand::CounterClockwise(0.8)).unwrap();
        assert_eq!(bridge.input_1.duty, 0);
        assert_eq!(bridge.input_2.duty, 800);
        assert_eq!(
            bridge.current_command(),
            MotorCommand::CounterClockwise(0.8)
        );
    }
}
