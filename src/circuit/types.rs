//! Core types for circuit representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a component in the circuit.
///
/// This is the component's position in the vertex arena. Normalization only
/// appends vertices, so an id stays valid for the lifetime of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub usize);

impl ComponentId {
    /// Raw index into the vertex list.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A wire between two components.
///
/// Topologically undirected, but the orientation fixes which connection slot
/// each endpoint lands in, and therefore the sign of branch currents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wire {
    pub start: ComponentId,
    pub end: ComponentId,
}

impl Wire {
    /// Create a wire from `start` to `end`.
    pub fn new(start: ComponentId, end: ComponentId) -> Self {
        Self { start, end }
    }
}

impl From<(usize, usize)> for Wire {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(ComponentId(start), ComponentId(end))
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start.0, self.end.0)
    }
}
