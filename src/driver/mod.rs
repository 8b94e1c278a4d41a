//! TMC2209 driver: register access, configuration surface and the status
//! poll cycle.

mod monitor;
mod settings;
mod status;
mod tmc2209;

pub use monitor::{Condition, StatusMonitor, StatusSample};
pub use settings::{MAX_HOLD_DELAY, MAX_POWER_DOWN_DELAY};
pub use status::{DriverStatus, GlobalStatus};
pub use tmc2209::Tmc2209;
