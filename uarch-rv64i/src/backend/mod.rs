//! The two [`uarch_bus::UarchBus`] implementations: access-log replay
//! (for single-step circuit verification) and direct RAM simulation
//! (for state-carrying use).

pub mod direct;
pub mod log;

pub use direct::UarchState;
pub use log::AccessLogBus;
