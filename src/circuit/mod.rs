//! Circuit graph representation, normalization and validation.
//!
//! This module provides the internal representation of a circuit: the
//! [`Circuit`] arena of components and wires, the normalizer that rewrites it
//! into a form the solver understands, and the loop search that decides
//! whether it is worth simulating at all.

mod graph;
mod normalize;
mod search;
mod types;
mod validate;

pub use graph::Circuit;
pub use search::{find_loop, find_loop_path, LoopPath};
pub use types::*;
pub use validate::{check_parameters, check_topology, loop_report, validate_circuit};
