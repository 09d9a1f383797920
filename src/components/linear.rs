//! Passive elements with per-variant state: Light bulb and Capacitor.
//!
//! Plain resistors carry no state beyond the shared `res` field on
//! [`Component`](super::Component), so they have no struct here.

use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing dissipated power to a bulb's rating.
pub const WATTAGE_TOLERANCE: f64 = 1e-6;

/// Display state of a light bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BulbState {
    On,
    #[default]
    Off,
}

/// A resistor that lights up when it dissipates its rated wattage.
#[derive(Debug, Clone, PartialEq)]
pub struct LightBulb {
    /// Rated power in watts
    pub wattage: f64,
    pub state: BulbState,
}

impl LightBulb {
    /// Create a new, unlit light bulb.
    pub fn new(wattage: f64) -> Self {
        Self {
            wattage,
            state: BulbState::Off,
        }
    }

    /// Update the on/off state from the power dissipated this step.
    pub fn update_state(&mut self, power: f64) {
        let lit = (power - self.wattage).abs() <= WATTAGE_TOLERANCE * self.wattage.abs().max(1.0);
        self.state = if lit { BulbState::On } else { BulbState::Off };
    }

    /// Whether the bulb is currently lit.
    pub fn is_on(&self) -> bool {
        self.state == BulbState::On
    }
}

/// A capacitor component.
///
/// Within one time step the capacitor is held at a fixed voltage `emf`, which
/// opposes the current that charges it. After the solve the branch current is
/// integrated forward (explicit Euler):
///   Q(n+1) = Q(n) + I(n) * dt
///   V(n+1) = Q(n+1) / C
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    /// Capacitance in farads
    pub capacitance: f64,
    /// Stored charge in coulombs
    pub charge: f64,
}

impl Capacitor {
    /// Create a capacitor pre-charged to `initial_voltage`.
    pub fn new(capacitance: f64, initial_voltage: f64) -> Self {
        Self {
            capacitance,
            charge: capacitance * initial_voltage,
        }
    }

    /// Voltage across the plates, or 0 for a degenerate (zero) capacitance.
    pub fn voltage(&self) -> f64 {
        if self.capacitance > 0.0 {
            self.charge / self.capacitance
        } else {
            0.0
        }
    }

    /// Integrate the branch current over one step and return the new voltage.
    pub fn integrate(&mut self, current: f64, dt: f64) -> f64 {
        if self.capacitance > 0.0 {
            self.charge += current * dt;
        }
        self.voltage()
    }

    /// RC time constant with the given series resistance.
    pub fn time_constant(&self, resistance: f64) -> f64 {
        resistance * self.capacitance
    }
}
