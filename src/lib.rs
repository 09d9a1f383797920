//! # Voltaic Core
//!
//! A DC and RC circuit simulator.
//!
//! This library provides:
//! - A component/wire graph model with a topology normalizer
//! - A loop validator that rejects circuits where no current could flow
//! - Nodal analysis (KCL at junctions, KVL across elements) solved densely
//! - Fixed-step time integration for circuits containing capacitors
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Circuit graph representation, normalization and validation
//! - [`components`] - Component models (batteries, resistors, capacitors, meters, etc.)
//! - [`solver`] - Matrix assembly, solving and the time-stepping driver
//! - [`netlist`] - JSON circuit descriptions
//! - [`output`] - CSV result writers
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! voltaic circuit.json --dt 1e-3 --steps 1000 --output results.csv
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use voltaic_core::circuit::{Circuit, Wire};
//! use voltaic_core::components::Component;
//! use voltaic_core::solver::{simulate, SimulatorConfig};
//!
//! let circuit = Circuit::from_parts(
//!     vec![Component::battery(12.0), Component::resistor(5.0)],
//!     vec![Wire::from((0, 1)), Wire::from((1, 0))],
//! );
//! let (circuit, _) = simulate(circuit, SimulatorConfig::default())?;
//! println!("{} A", circuit.vertices[1].curr);
//! # Ok::<(), voltaic_core::VoltaicError>(())
//! ```
//!
//! ## Simulation Method
//!
//! Before anything is solved the circuit is normalized: every wire between
//! two elements gets a junction, every wire between two junctions gets a
//! null component, and one junction becomes ground. Each remaining
//! component then owns one unknown. For each step:
//!
//! 1. Assemble the system matrix A and source vector z
//! 2. Solve Ax = z for junction potentials and branch currents
//! 3. Derive voltages, meter readings and bulb states from the solution
//! 4. Integrate capacitor charge with explicit Euler
//!
//! A circuit without capacitors is solved once.

pub mod circuit;
pub mod components;
pub mod error;
pub mod netlist;
pub mod output;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{Result, VoltaicError};
pub use solver::{Simulator, SimulatorConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitSim;
