//! Nodal-analysis solver and time-stepping driver.
//!
//! This module provides the numerical engine for circuit simulation.
//!
//! ## Nodal Analysis
//!
//! Every non-ground component owns one unknown and one equation in a dense
//! system Ax = z:
//! - a junction's unknown is its potential, its equation is KCL over the
//!   branch currents of its neighbours
//! - a two-terminal element's unknown is its branch current, its equation is
//!   KVL across it (or `I = 0` for an open element)
//!
//! ```text
//! [ 0   K ] [ v ]   [ 0 ]
//! [ D   R ] [ i ] = [ e ]
//! ```
//!
//! where:
//! - K holds the +1/-1 KCL incidence of branch currents at each junction
//! - D holds the -1/+1 potential differences across each element
//! - R is diagonal, the element resistances
//! - e is the vector of source terms (battery and capacitor voltages)
//!
//! ## Time stepping
//!
//! A purely resistive circuit is solved once. When a capacitor is present the
//! system is re-assembled and solved `num_steps` times at a fixed `dt`, each
//! capacitor holding its voltage constant within a step and integrating its
//! branch current afterwards.

mod mna;
mod simulator;

pub use mna::{assemble, MnaMatrix, RowMap};
pub use simulator::{simulate, SimulationResult, Simulator, SimulatorConfig};

/// Default time step in seconds.
pub const DEFAULT_DT: f64 = 1e-3;

/// Default number of time steps for circuits with capacitors.
pub const DEFAULT_NUM_STEPS: usize = 1000;
