//! Fixed-order mapping from status conditions to alert events.

use crate::events::{AlertEvent, EventDispatcher, ThresholdHandler};

use super::status::DriverStatus;

/// Events raised by one edge of a condition, in delivery order.
type Reaction = &'static [AlertEvent];

/// Monitored status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Condition {
    /// DIAG output (stall or driver error)
    Diag,
    /// INDEX output
    Index,
    /// Derived: no pre-warning and no overtemperature
    TemperatureNormal,
    /// DRV_STATUS.otpw
    OvertemperaturePrewarning,
    /// DRV_STATUS.ot
    Overtemperature,
    /// DRV_STATUS.t120
    T120,
    /// DRV_STATUS.t143
    T143,
    /// DRV_STATUS.t150
    T150,
    /// DRV_STATUS.t157
    T157,
}

impl Condition {
    /// Evaluation order within one poll cycle.
    pub const ORDER: [Condition; 9] = [
        Condition::Diag,
        Condition::Index,
        Condition::TemperatureNormal,
        Condition::OvertemperaturePrewarning,
        Condition::Overtemperature,
        Condition::T120,
        Condition::T143,
        Condition::T150,
        Condition::T157,
    ];

    /// Events for the rising and the falling edge.
    fn reactions(self) -> (Reaction, Option<Reaction>) {
        use AlertEvent::*;
        const DIAG: Reaction = &[DiagTriggered, Stalled];
        const INDEX: Reaction = &[IndexTriggered];
        const NORMAL: Reaction = &[TemperatureNormal];
        const PREWARNING: Reaction = &[OvertemperaturePrewarning];
        const OVERTEMPERATURE: Reaction = &[Overtemperature];
        const ABOVE_120: Reaction = &[TemperatureAbove120C];
        const BELOW_120: Reaction = &[TemperatureBelow120C];
        const ABOVE_143: Reaction = &[TemperatureAbove143C];
        const BELOW_143: Reaction = &[TemperatureBelow143C];
        const ABOVE_150: Reaction = &[TemperatureAbove150C];
        const BELOW_150: Reaction = &[TemperatureBelow150C];
        const ABOVE_157: Reaction = &[TemperatureAbove157C];
        const BELOW_157: Reaction = &[TemperatureBelow157C];

        match self {
            Condition::Diag => (DIAG, None),
            Condition::Index => (INDEX, None),
            Condition::TemperatureNormal => (NORMAL, None),
            Condition::OvertemperaturePrewarning => (PREWARNING, None),
            Condition::Overtemperature => (OVERTEMPERATURE, None),
            Condition::T120 => (ABOVE_120, Some(BELOW_120)),
            Condition::T143 => (ABOVE_143, Some(BELOW_143)),
            Condition::T150 => (ABOVE_150, Some(BELOW_150)),
            Condition::T157 => (ABOVE_157, Some(BELOW_157)),
        }
    }
}

/// Values sampled during one poll cycle.
///
/// `None` means the value could not be obtained this cycle; the matching
/// handler keeps its previous state.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSample {
    /// DIAG level or latched rising edge
    pub diag: Option<bool>,
    /// Latched INDEX rising edge
    pub index: Option<bool>,
    /// DRV_STATUS contents
    pub drv_status: Option<DriverStatus>,
}

impl StatusSample {
    fn value(&self, condition: Condition) -> Option<bool> {
        let status = self.drv_status;
        match condition {
            Condition::Diag => self.diag,
            Condition::Index => self.index,
            Condition::TemperatureNormal => status.map(|s| s.temperature_normal()),
            Condition::OvertemperaturePrewarning => status.map(|s| s.otpw),
            Condition::Overtemperature => status.map(|s| s.ot),
            Condition::T120 => status.map(|s| s.t120),
            Condition::T143 => status.map(|s| s.t143),
            Condition::T150 => status.map(|s| s.t150),
            Condition::T157 => status.map(|s| s.t157),
        }
    }
}

/// One edge detector per condition, evaluated in [`Condition::ORDER`].
#[derive(Debug, Clone)]
pub struct StatusMonitor {
    handlers: [(Condition, ThresholdHandler<Reaction>); 9],
}

impl Default for StatusMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMonitor {
    /// Create a monitor whose handlers track state but raise nothing yet.
    pub fn new() -> Self {
        Self {
            handlers: Condition::ORDER.map(|c| (c, ThresholdHandler::new())),
        }
    }

    /// Attach the alert events to every handler.
    pub fn arm(&mut self) {
        for (condition, handler) in self.handlers.iter_mut() {
            match condition.reactions() {
                (rise, Some(fall)) => handler.set_callbacks(rise, fall),
                (rise, None) => handler.set_callback(rise),
            }
        }
    }

    /// Last observed state of `condition`.
    pub fn state(&self, condition: Condition) -> bool {
        self.handlers
            .iter()
            .find(|(c, _)| *c == condition)
            .map(|(_, h)| h.state())
            .unwrap_or(false)
    }

    /// Feed one cycle of samples, dispatching events in order.
    pub fn evaluate(&mut self, sample: &StatusSample, dispatcher: &EventDispatcher<'_>) {
        for (condition, handler) in self.handlers.iter_mut() {
            let Some(value) = sample.value(*condition) else {
                continue;
            };
            if let Some(events) = handler.check(value) {
                for &event in events.iter() {
                    dispatcher.dispatch(event);
                }
            }
        }
    }
}
