//! Circuit graph structure.

use super::types::{ComponentId, Wire};
use crate::components::{Component, INPUT_SLOT, OUTPUT_SLOT};
use crate::error::{Result, VoltaicError};

/// A circuit: an arena of components (vertices) and the wires between them.
///
/// Component ids are positions in `vertices` and never change; the normalizer
/// only appends vertices and replaces wires.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// All components in the circuit
    pub vertices: Vec<Component>,
    /// All wires in the circuit
    pub edges: Vec<Wire>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from raw vertex and edge lists.
    ///
    /// Unnamed components get a label from their kind and index, and every
    /// component's connection slots are derived from the edges.
    pub fn from_parts(vertices: Vec<Component>, edges: Vec<Wire>) -> Self {
        let mut circuit = Self { vertices, edges };
        for idx in 0..circuit.vertices.len() {
            circuit.ensure_name(ComponentId(idx));
        }
        circuit.update_connections();
        circuit
    }

    /// Add a component and return its id.
    pub fn add(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.vertices.len());
        self.vertices.push(component);
        self.ensure_name(id);
        id
    }

    /// Wire two components together.
    ///
    /// The wire leaves `start` through its output slot and enters `end`
    /// through its input slot, so current flowing along the wire is positive
    /// in both elements.
    pub fn connect(&mut self, start: ComponentId, end: ComponentId) -> Result<()> {
        let len = self.vertices.len();
        for id in [start, end] {
            if id.0 >= len {
                return Err(VoltaicError::EdgeOutOfRange {
                    edge: self.edges.len(),
                    index: id.0,
                    len,
                });
            }
        }
        let wire = Wire::new(start, end);
        self.edges.push(wire);
        self.attach(wire);
        Ok(())
    }

    fn ensure_name(&mut self, id: ComponentId) {
        let component = &mut self.vertices[id.0];
        if component.name.is_empty() {
            component.name = format!("{}{}", component.kind.prefix(), id.0);
        }
    }

    /// Re-derive every component's connection slots from the edge list.
    ///
    /// For wire `(s, e)`, `e` goes into the output slot of `s` and `s` into
    /// the input slot of `e`, falling back to the first free slot (junctions
    /// simply fill up in edge order). Wires pointing outside the arena are
    /// skipped; [`check_edges`](Self::check_edges) reports them.
    pub fn update_connections(&mut self) {
        for component in &mut self.vertices {
            component.clear_connections();
        }
        let len = self.vertices.len();
        for wire in &self.edges {
            if wire.start.0 >= len || wire.end.0 >= len {
                continue;
            }
            attach(&mut self.vertices, *wire);
        }
    }

    fn attach(&mut self, wire: Wire) {
        attach(&mut self.vertices, wire);
    }

    /// Check that every wire references existing, distinct components.
    pub fn check_edges(&self) -> Result<()> {
        let len = self.vertices.len();
        for (edge, wire) in self.edges.iter().enumerate() {
            for id in [wire.start, wire.end] {
                if id.0 >= len {
                    return Err(VoltaicError::EdgeOutOfRange {
                        edge,
                        index: id.0,
                        len,
                    });
                }
            }
            if wire.start == wire.end {
                return Err(VoltaicError::SelfLoop {
                    edge,
                    component: self.vertices[wire.start.0].name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the circuit has no components.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get a component by id.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.vertices[id.0]
    }

    /// Get a mutable component by id.
    pub fn component_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.vertices[id.0]
    }

    /// Find a component id by name.
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.vertices
            .iter()
            .position(|c| c.name == name)
            .map(ComponentId)
    }

    /// Ids of all components, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.vertices.len()).map(ComponentId)
    }

    /// The ground junction, if one has been designated.
    pub fn ground(&self) -> Option<ComponentId> {
        self.vertices
            .iter()
            .position(|c| c.is_ground())
            .map(ComponentId)
    }

    /// Ids of all EMF sources (batteries and capacitors).
    pub fn emf_sources(&self) -> Vec<ComponentId> {
        self.ids()
            .filter(|&id| self.component(id).is_emf_source())
            .collect()
    }

    /// Whether any capacitor is present (requires time stepping).
    pub fn has_capacitors(&self) -> bool {
        self.vertices.iter().any(|c| c.is_capacitor())
    }

    /// Adjacency list: for each component, the `(edge index, neighbour)` pairs
    /// of every wire touching it.
    pub fn adjacency(&self) -> Vec<Vec<(usize, ComponentId)>> {
        let mut adj = vec![Vec::new(); self.vertices.len()];
        for (idx, wire) in self.edges.iter().enumerate() {
            if wire.start.0 < adj.len() && wire.end.0 < adj.len() {
                adj[wire.start.0].push((idx, wire.end));
                adj[wire.end.0].push((idx, wire.start));
            }
        }
        adj
    }

    /// Potential of a junction, or voltage across an element.
    pub fn voltage(&self, id: ComponentId) -> f64 {
        self.component(id).emf
    }

    /// Potential difference across a two-terminal element, read from the
    /// junctions in its slots: `V(slot 0) - V(slot 1)`.
    pub fn potential_across(&self, id: ComponentId) -> f64 {
        let component = self.component(id);
        let potential = |slot| {
            component
                .connection(slot)
                .map(|n: ComponentId| self.vertices[n.0].emf)
                .unwrap_or(0.0)
        };
        potential(0) - potential(1)
    }

    /// Signed sum of branch currents entering a junction (zero when KCL holds).
    pub fn kcl_residual(&self, junction: ComponentId) -> f64 {
        self.component(junction)
            .connections()
            .map(|n| {
                let neighbour = self.component(n);
                neighbour.kcl_sign(junction) * neighbour.curr
            })
            .sum()
    }

    /// Total current flowing into a junction from its neighbours.
    pub fn junction_inflow(&self, junction: ComponentId) -> f64 {
        self.component(junction)
            .connections()
            .map(|n| {
                let neighbour = self.component(n);
                (neighbour.kcl_sign(junction) * neighbour.curr).max(0.0)
            })
            .sum()
    }

    /// Clear every component's recorded history.
    pub fn clear_history(&mut self) {
        for component in &mut self.vertices {
            component.history.clear();
        }
    }
}

fn attach(vertices: &mut [Component], wire: Wire) {
    vertices[wire.start.0].attach(wire.end, OUTPUT_SLOT);
    vertices[wire.end.0].attach(wire.start, INPUT_SLOT);
}
