#![no_std]
#![no_main]

mod loggers;

#[cfg(feature = "defmt_logger")]
use panic_probe as _;

#[cfg(feature = "null_logger")]
use panic_halt as _;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[rtic::app(device = stm32f4xx_hal::pac, dispatchers = [USART1, USART3])]
mod app {
    use super::*;

    use esc_hardware::{
        led::{EnableLed, FaultLed, HeartbeatLed, RangeLed},
        motors::{mc33886::DriveMotor, OpenLoopDrive},
        pulse_input::SpeedCmdPin,
        EscHardware, TIM2_CLOCK_HZ,
    };
    use pulse_decode::{Direction, Instant, MotorCommand, PulseWidth, MICROS_CALIBRATION};

    use fugit::TimerDurationU64;
    use log::{debug, error, info, trace, warn};
    use rtic_monotonics::stm32::Tim2;
    use rtic_monotonics::Monotonic;

    /// Nominal frame period of the command signal.
    const FRAME_PERIOD: TimerDurationU64<1_000_000> = TimerDurationU64::<1_000_000>::millis(20);
    /// Three missed frames in a row and the signal is considered gone.
    const SIGNAL_TIMEOUT: TimerDurationU64<1_000_000> = TimerDurationU64::<1_000_000>::millis(60);
    const HEARTBEAT_PERIOD: TimerDurationU64<1_000_000> =
        TimerDurationU64::<1_000_000>::millis(500);

    /// Latest completed measurement, overwritten on every falling edge.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct SpeedCommand {
        pub width: PulseWidth,
        pub direction: Direction,
        pub at: Instant,
    }

    #[shared]
    struct Shared {
        /// Single slot between the edge handler (writer) and the drive and
        /// failsafe tasks (readers). `None` until the first pulse lands and
        /// again whenever the failsafe gives up on the signal.
        command: Option<SpeedCommand>,
        motor: DriveMotor,
        _enable_led: EnableLed,
    }

    #[local]
    struct Local {
        speed_cmd: SpeedCmdPin,
        range_led: RangeLed,
        fault_led: FaultLed,
        heartbeat_led: HeartbeatLed,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        loggers::init(loggers::Level::Info);
        info!("{} v{}", NAME, VERSION);

        // set DBGMCU to allow wfi in idle function while using defmt
        ctx.device.DBGMCU.cr.modify(|_, w| {
            w.dbg_sleep().set_bit();
            w.dbg_standby().set_bit();
            w.dbg_stop().set_bit()
        });
        // enabling the dma1 clock keeps one AHB bus master active, which prevents SRAM from reading as 0's
        // https://github.com/probe-rs/probe-rs/issues/350#issuecomment-740550519
        ctx.device.RCC.ahb1enr.modify(|_, w| w.dma1en().enabled());

        let mut board = EscHardware::init(ctx.device);

        let token = rtic_monotonics::create_stm32_tim2_monotonic_token!();
        Tim2::start(TIM2_CLOCK_HZ, token);

        info!(
            "zero band {}..={} us",
            MICROS_CALIBRATION.zero_low(),
            MICROS_CALIBRATION.zero_high()
        );

        // Bridge inputs are parked at zero duty, safe to wake the driver
        board.motor.set_enable(true);
        board.enable_led.set_high();

        failsafe::spawn().unwrap();
        heartbeat::spawn().unwrap();

        (
            Shared {
                command: None,
                motor: board.motor,
                _enable_led: board.enable_led,
            },
            Local {
                speed_cmd: board.speed_cmd,
                range_led: board.range_led,
                fault_led: board.fault_led,
                heartbeat_led: board.heartbeat_led,
            },
        )
    }

    /// Both edges of the command line land here. A rising edge only arms the
    /// measurement; a falling edge yields a width, which gets classified and
    /// published. A failed drive spawn means a pass is already pending or
    /// still running, and that pass re-reads the slot before it parks.
    #[task(priority = 3, binds = EXTI4, shared = [command], local = [speed_cmd, range_led, out_of_range: u32 = 0])]
    fn speed_cmd_edge(mut ctx: speed_cmd_edge::Context) {
        let speed_cmd = ctx.local.speed_cmd;
        speed_cmd.clear_interrupt();

        let now = Tim2::now();
        if let Some(width) = speed_cmd.poll_edge(now) {
            let direction = MICROS_CALIBRATION.classify(width);

            if MICROS_CALIBRATION.in_range(width) {
                ctx.local.range_led.set_low();
            } else {
                *ctx.local.out_of_range += 1;
                ctx.local.range_led.set_high();
                warn!(
                    "width {} us out of range ({} so far), clamping",
                    width.ticks(),
                    ctx.local.out_of_range
                );
            }

            debug!("width {} us -> {:?}", width.ticks(), direction);

            ctx.shared.command.lock(|cmd| {
                *cmd = Some(SpeedCommand {
                    width,
                    direction,
                    at: now,
                });
            });
            drive::spawn().ok();
        }
    }

    /// Applies the newest command to the bridge. Runs once per completed
    /// pulse and whenever the failsafe empties the slot. A spawn is refused
    /// while a pass is in flight; the loop re-reads the slot after each
    /// motor write and parks only once the slot matches what was applied.
    #[task(priority = 2, shared = [command, motor])]
    async fn drive(mut ctx: drive::Context) {
        let mut target = ctx.shared.command.lock(|cmd| *cmd);
        loop {
            let output = match target {
                Some(cmd) => MICROS_CALIBRATION.decode(cmd.width),
                None => MotorCommand::Zero,
            };

            ctx.shared.motor.lock(|motor| {
                if let Err(e) = motor.drive(output) {
                    error!("bridge refused command: {:?}", e);
                }
            });

            let latest = ctx.shared.command.lock(|cmd| *cmd);
            if latest == target {
                break;
            }
            target = latest;
        }
    }

    /// Watches for signal loss and driver faults. Emptying the slot makes
    /// the next drive pass park the bridge at zero.
    #[task(priority = 2, shared = [command, motor], local = [fault_led])]
    async fn failsafe(mut ctx: failsafe::Context) {
        loop {
            Tim2::delay(FRAME_PERIOD).await;

            let now = Tim2::now();
            let timed_out = ctx.shared.command.lock(|cmd| {
                let stale = match *cmd {
                    Some(c) => now
                        .checked_duration_since(c.at)
                        .map_or(false, |age| age > SIGNAL_TIMEOUT),
                    None => false,
                };
                if stale {
                    cmd.take().map(|c| c.direction)
                } else {
                    None
                }
            });

            if let Some(direction) = timed_out {
                warn!(
                    "no pulse for {} ms, dropping {:?} and forcing zero",
                    SIGNAL_TIMEOUT.to_millis(),
                    direction
                );
                drive::spawn().ok();
            }

            let faulted = ctx.shared.motor.lock(|motor| motor.is_faulted());
            if faulted {
                error!("MC33886 pulled FS low, parking the bridge");
                // The driver refuses duty on its own while FS is low; emptying
                // the slot keeps a pre-fault width from coming back once the
                // chip recovers.
                ctx.shared.command.lock(|cmd| *cmd = None);
                drive::spawn().ok();
            }

            let signal_lost = ctx.shared.command.lock(|cmd| cmd.is_none());
            if faulted || signal_lost {
                ctx.local.fault_led.set_high();
            } else {
                ctx.local.fault_led.set_low();
            }
        }
    }

    #[task(priority = 1, local = [heartbeat_led])]
    async fn heartbeat(ctx: heartbeat::Context) {
        loop {
            Tim2::delay(HEARTBEAT_PERIOD).await;
            ctx.local.heartbeat_led.toggle();
            trace!("heartbeat!");
        }
    }

    #[idle]
    fn idle(_ctx: idle::Context) -> ! {
        info!("idle!");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
