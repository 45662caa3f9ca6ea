use defmt::{debug, error, info, trace, warn};
use defmt_rtt as _;
use log::{Level, Metadata, Record};

pub struct LoggerType;

static DEFMT_LOGGER: LoggerType = LoggerType;

pub fn init(level: Level) {
    log::set_logger(&DEFMT_LOGGER).unwrap();
    log::set_max_level(level.to_level_filter());
}

impl log::Log for LoggerType {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let args = defmt::Display2Format(record.args());
            match record.metadata().level() {
                Level::Trace => trace!("{}", args),
                Level::Debug => debug!("{}", args),
                Level::Info => info!("{}", args),
                Level::Warn => warn!("{}", args),
                Level::Error => error!("{}", args),
            }
        }
    }

    fn flush(&self) {}
}
