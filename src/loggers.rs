#[cfg(feature = "defmt_logger")]
#[cfg(not(feature = "null_logger"))]
pub mod defmt_logger;

#[cfg(feature = "null_logger")]
#[cfg(not(feature = "defmt_logger"))]
pub mod null_logger;

#[cfg(feature = "defmt_logger")]
#[cfg(not(feature = "null_logger"))]
pub use defmt_logger::init;

#[cfg(feature = "null_logger")]
#[cfg(not(feature = "defmt_logger"))]
pub use null_logger::init;

pub use log::Level;
