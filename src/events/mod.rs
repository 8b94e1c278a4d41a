//! Threshold-crossing events.
//!
//! Status bits are sampled once per poll cycle and fed into edge detectors
//! ([`ThresholdHandler`]). Transitions turn into [`AlertEvent`]s that the
//! [`EventDispatcher`] hands to every registered listener, synchronously and
//! in registration order.

mod alert;
mod threshold;
mod trigger;

pub use alert::{AlertEvent, AlertListener, EventDispatcher, MAX_LISTENERS};
pub use threshold::{Edge, ThresholdHandler};
pub use trigger::{EdgeInput, TriggerFlag};
