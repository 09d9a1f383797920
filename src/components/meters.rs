//! Measurement instruments.

use serde::{Deserialize, Serialize};

/// What a multimeter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterMode {
    /// Infinite resistance, reads the potential difference across its leads.
    #[default]
    Voltmeter,
    /// Zero resistance, reads the current through it.
    Ammeter,
}

/// A multimeter.
///
/// The reading is refreshed only after every other component has settled for
/// the step, so it always reflects final values.
#[derive(Debug, Clone, PartialEq)]
pub struct Multimeter {
    pub mode: MeterMode,
    /// Last reading (volts or amperes depending on mode)
    pub reading: f64,
}

impl Multimeter {
    /// Create a new multimeter.
    pub fn new(mode: MeterMode) -> Self {
        Self { mode, reading: 0.0 }
    }

    /// Whether the meter is in voltmeter mode.
    pub fn is_voltmeter(&self) -> bool {
        self.mode == MeterMode::Voltmeter
    }
}
