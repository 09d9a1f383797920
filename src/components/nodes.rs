//! Node-like components: Junction.

/// Fewest connection slots a junction may have (normalizer-inserted junctions).
pub const MIN_JUNCTION_SLOTS: usize = 2;

/// Most connection slots a junction may have.
pub const MAX_JUNCTION_SLOTS: usize = 5;

/// A merge point between wires. Its unknown in the linear system is its
/// potential; the ground junction is fixed at 0 V and has no unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Junction {
    pub ground: bool,
}

impl Junction {
    /// Create a new, non-ground junction.
    pub fn new() -> Self {
        Self { ground: false }
    }
}
