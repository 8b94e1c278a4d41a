//! Alert events and their synchronous fan-out.

use heapless::Vec;

/// Maximum number of listeners per dispatcher.
pub const MAX_LISTENERS: usize = 8;

/// Conditions reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertEvent {
    /// StallGuard flagged a stall on DIAG
    Stalled,
    /// Rising edge on DIAG
    DiagTriggered,
    /// Rising edge on INDEX
    IndexTriggered,
    /// Neither overtemperature pre-warning nor overtemperature is active
    TemperatureNormal,
    /// Overtemperature pre-warning threshold reached
    OvertemperaturePrewarning,
    /// Overtemperature shutdown threshold reached
    Overtemperature,
    /// Die temperature rose above 120 °C
    TemperatureAbove120C,
    /// Die temperature fell below 120 °C
    TemperatureBelow120C,
    /// Die temperature rose above 143 °C
    TemperatureAbove143C,
    /// Die temperature fell below 143 °C
    TemperatureBelow143C,
    /// Die temperature rose above 150 °C
    TemperatureAbove150C,
    /// Die temperature fell below 150 °C
    TemperatureBelow150C,
    /// Die temperature rose above 157 °C
    TemperatureAbove157C,
    /// Die temperature fell below 157 °C
    TemperatureBelow157C,
}

/// Receiver of alert events.
///
/// Called synchronously from the poll cycle; a slow listener delays the
/// cycle. Listeners are shared by reference, so any state they record
/// lives behind interior mutability.
pub trait AlertListener {
    /// Handle one event.
    fn on_alert(&self, event: AlertEvent);
}

impl<F> AlertListener for F
where
    F: Fn(AlertEvent),
{
    fn on_alert(&self, event: AlertEvent) {
        self(event)
    }
}

/// Ordered list of listeners receiving every event.
pub struct EventDispatcher<'a> {
    listeners: Vec<&'a dyn AlertListener, MAX_LISTENERS>,
}

impl<'a> Default for EventDispatcher<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> EventDispatcher<'a> {
    /// Create a dispatcher without listeners.
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Append a listener. Returns `false` if the list is full.
    pub fn add_listener(&mut self, listener: &'a dyn AlertListener) -> bool {
        self.listeners.push(listener).is_ok()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in registration order.
    pub fn dispatch(&self, event: AlertEvent) {
        log::debug!("alert {:?}", event);
        for listener in &self.listeners {
            listener.on_alert(event);
        }
    }
}
