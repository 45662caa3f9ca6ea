use pulse_decode::MotorCommand;

pub mod hbridge;
pub mod mc33886;

/// Open-loop motor output: no feedback, the command is the whole truth.
pub trait OpenLoopDrive {
    type Error;

    fn drive(&mut self, command: MotorCommand) -> Result<(), Self::Error>;
    fn current_command(&self) -> MotorCommand;
}
