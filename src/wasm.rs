//! WASM bindings for Voltaic Core.
//!
//! This module provides JavaScript-friendly bindings for the browser circuit
//! editor, which exchanges circuits as the JSON described in [`crate::netlist`].
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitSim } from 'voltaic_core';
//!
//! await init();
//!
//! const sim = new WasmCircuitSim(JSON.stringify({
//!   vertices: [
//!     { type: 'battery', voltage: 12 },
//!     { type: 'resistor', resistance: 5 },
//!   ],
//!   edges: [[0, 1], [1, 0]],
//! }));
//!
//! if (sim.validate()) {
//!   const csv = sim.run(1e-3, 1000);
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{check_parameters, check_topology, validate_circuit, Circuit};
use crate::error::VoltaicError;
use crate::netlist::CircuitDescription;
use crate::output;
use crate::solver::{Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: VoltaicError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible circuit simulator.
///
/// Holds the normalized circuit; every `run` simulates a fresh copy so the
/// editor can re-run with different time settings.
#[wasm_bindgen]
pub struct WasmCircuitSim {
    circuit: Circuit,
}

#[wasm_bindgen]
impl WasmCircuitSim {
    /// Create a new simulator from a JSON circuit description.
    ///
    /// # Returns
    /// A new `WasmCircuitSim`, or an error if the JSON is malformed or a
    /// wire references a missing component.
    #[wasm_bindgen(constructor)]
    pub fn new(circuit_json: &str) -> Result<WasmCircuitSim, JsValue> {
        let mut circuit = CircuitDescription::from_json(circuit_json)
            .map_err(to_js)?
            .to_circuit();
        circuit.normalize().map_err(to_js)?;
        Ok(WasmCircuitSim { circuit })
    }

    /// Whether the circuit can be simulated.
    ///
    /// Topology and parameter violations are errors; a circuit where no
    /// current could flow returns `false`.
    #[wasm_bindgen]
    pub fn validate(&self) -> Result<bool, JsValue> {
        check_topology(&self.circuit).map_err(to_js)?;
        check_parameters(&self.circuit).map_err(to_js)?;
        validate_circuit(&self.circuit).map_err(to_js)
    }

    /// Run the simulation and return the results as CSV.
    ///
    /// # Arguments
    /// * `dt` - Time step in seconds (ignored without capacitors)
    /// * `num_steps` - Number of steps (ignored without capacitors)
    #[wasm_bindgen]
    pub fn run(&self, dt: f64, num_steps: usize) -> Result<String, JsValue> {
        let config = SimulatorConfig::new().with_dt(dt).with_num_steps(num_steps);
        let mut simulator = Simulator::with_config(self.circuit.clone(), config).map_err(to_js)?;
        let result = simulator.run().map_err(to_js)?;

        let mut buf = Vec::new();
        output::write_csv(simulator.circuit(), &result, &mut buf).map_err(to_js)?;
        String::from_utf8(buf).map_err(|e| {
            to_js(VoltaicError::WasmError {
                message: e.to_string(),
            })
        })
    }

    /// The normalized circuit as JSON, for drawing inserted junctions.
    #[wasm_bindgen]
    pub fn normalized(&self) -> Result<String, JsValue> {
        CircuitDescription::from_circuit(&self.circuit)
            .to_json()
            .map_err(to_js)
    }

    /// Number of components after normalization.
    #[wasm_bindgen(getter)]
    pub fn component_count(&self) -> usize {
        self.circuit.len()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
