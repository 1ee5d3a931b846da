pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{SimClock, TimePeriod};
pub use config::SimulationConfig;
pub use error::{Result, SimError};
