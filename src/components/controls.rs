//! Control components: Switch.

/// A switch component.
///
/// Closed, it is an ideal conductor (zero volts across it). Open, it forces
/// its branch current to zero and breaks any loop running through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub closed: bool,
}

impl Switch {
    /// Create a new switch.
    pub fn new(closed: bool) -> Self {
        Self { closed }
    }

    /// Set the switch state.
    pub fn set_state(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Toggle the switch state.
    pub fn toggle(&mut self) {
        self.closed = !self.closed;
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_state() {
        let mut switch = Switch::default();
        assert!(switch.closed);
        switch.toggle();
        assert!(!switch.closed);
        switch.set_state(true);
        assert!(switch.closed);
    }
}
