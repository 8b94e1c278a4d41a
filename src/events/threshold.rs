//! Edge detection for polled status bits.

/// Direction of a detected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// false -> true
    Rising,
    /// true -> false
    Falling,
}

/// Turns a sampled boolean into exactly one notification per transition.
///
/// Starts out `false`. Repeated identical samples never fire. A handler
/// without a fall reaction acts as a one-shot notifier per rising edge.
#[derive(Debug, Clone)]
pub struct ThresholdHandler<T> {
    previous: bool,
    on_rise: Option<T>,
    on_fall: Option<T>,
}

impl<T> Default for ThresholdHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ThresholdHandler<T> {
    /// Create a handler with no reactions.
    pub const fn new() -> Self {
        Self {
            previous: false,
            on_rise: None,
            on_fall: None,
        }
    }

    /// Set the reaction to a rising edge.
    pub fn set_callback(&mut self, on_rise: T) {
        self.on_rise = Some(on_rise);
    }

    /// Set reactions to both edges.
    pub fn set_callbacks(&mut self, on_rise: T, on_fall: T) {
        self.on_rise = Some(on_rise);
        self.on_fall = Some(on_fall);
    }

    /// Last sampled value.
    #[inline]
    pub fn state(&self) -> bool {
        self.previous
    }

    /// Feed a new sample and report the transition, if any.
    pub fn edge(&mut self, value: bool) -> Option<Edge> {
        let edge = match (self.previous, value) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.previous = value;
        edge
    }

    /// Feed a new sample and return the reaction registered for the
    /// transition it caused.
    pub fn check(&mut self, value: bool) -> Option<&mut T> {
        match self.edge(value)? {
            Edge::Rising => self.on_rise.as_mut(),
            Edge::Falling => self.on_fall.as_mut(),
        }
    }
}
