//! Topology normalization.
//!
//! Rewrites a raw circuit so that:
//! 1. every two-terminal element is wired only to junctions,
//! 2. no two junctions are wired directly together (a null component sits
//!    between them),
//! 3. exactly one junction is ground,
//! 4. connection slots are re-derived from the final wire list.
//!
//! Each pass counts its insertions first, reserves once, then rebuilds the
//! wire list in a single sweep. Normalizing an already normalized circuit
//! changes nothing.

use tracing::debug;

use super::graph::Circuit;
use super::types::{ComponentId, Wire};
use crate::components::Component;
use crate::error::Result;

impl Circuit {
    /// Run the full normalization pipeline in place.
    ///
    /// Fails only when a wire references a missing component or connects a
    /// component to itself; in that case the circuit is left untouched.
    pub fn normalize(&mut self) -> Result<()> {
        self.check_edges()?;
        self.absorb_wires();
        self.add_junctions()?;
        self.add_nulls()
    }

    /// Turn bare wire vertices into two-slot junctions.
    fn absorb_wires(&mut self) {
        for component in &mut self.vertices {
            component.absorb_wire();
        }
    }

    /// Split every wire between two non-junction components with a new
    /// two-slot junction, then designate ground.
    ///
    /// Ground is the last junction created here; if none were created the
    /// last existing junction is used, and if the circuit has no junction at
    /// all a fresh one is appended. An existing ground is kept.
    pub fn add_junctions(&mut self) -> Result<()> {
        self.check_edges()?;
        let needs_split = |circuit: &Circuit, wire: &Wire| {
            !circuit.vertices[wire.start.0].is_junction() && !circuit.vertices[wire.end.0].is_junction()
        };
        let inserts = self.edges.iter().filter(|&w| needs_split(self, w)).count();

        let mut last_created = None;
        if inserts > 0 {
            self.vertices.reserve(inserts);
            let mut edges = Vec::with_capacity(self.edges.len() + inserts);
            for wire in std::mem::take(&mut self.edges) {
                if needs_split(self, &wire) {
                    let junction = self.add(Component::junction(2));
                    edges.push(Wire::new(wire.start, junction));
                    edges.push(Wire::new(junction, wire.end));
                    last_created = Some(junction);
                } else {
                    edges.push(wire);
                }
            }
            self.edges = edges;
            debug!(inserted = inserts, "split element-to-element wires with junctions");
        }

        if self.ground().is_none() {
            let ground = last_created
                .or_else(|| self.last_junction())
                .unwrap_or_else(|| self.add(Component::junction(2)));
            self.vertices[ground.0].mark_ground();
            debug!(ground = %self.vertices[ground.0].name, "designated ground junction");
        }

        self.update_connections();
        Ok(())
    }

    /// Insert a null component between every pair of directly wired junctions.
    pub fn add_nulls(&mut self) -> Result<()> {
        self.check_edges()?;
        let needs_null = |circuit: &Circuit, wire: &Wire| {
            circuit.vertices[wire.start.0].is_junction() && circuit.vertices[wire.end.0].is_junction()
        };
        let inserts = self.edges.iter().filter(|&w| needs_null(self, w)).count();

        if inserts > 0 {
            self.vertices.reserve(inserts);
            let mut edges = Vec::with_capacity(self.edges.len() + inserts);
            for wire in std::mem::take(&mut self.edges) {
                if needs_null(self, &wire) {
                    let null = self.add(Component::null());
                    edges.push(Wire::new(wire.start, null));
                    edges.push(Wire::new(null, wire.end));
                } else {
                    edges.push(wire);
                }
            }
            self.edges = edges;
            debug!(inserted = inserts, "separated adjacent junctions with null components");
        }

        self.update_connections();
        Ok(())
    }

    fn last_junction(&self) -> Option<ComponentId> {
        self.vertices
            .iter()
            .rposition(|c| c.is_junction())
            .map(ComponentId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentKind;
    use crate::error::VoltaicError;

    fn series_loop() -> Circuit {
        Circuit::from_parts(
            vec![Component::battery(12.0), Component::resistor(5.0)],
            vec![Wire::from((0, 1)), Wire::from((1, 0))],
        )
    }

    #[test]
    fn test_add_junctions_splits_every_element_wire() {
        let mut circuit = series_loop();
        circuit.normalize().unwrap();

        // Two junctions inserted, no nulls needed
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.edges.len(), 4);
        assert_eq!(circuit.ground(), Some(ComponentId(3)));

        for id in circuit.ids() {
            let component = circuit.component(id);
            assert!(component.is_fully_connected());
            if component.is_two_terminal() {
                for n in component.connections() {
                    assert!(circuit.component(n).is_junction());
                }
            }
        }
    }

    #[test]
    fn test_split_preserves_orientation() {
        let mut circuit = series_loop();
        circuit.normalize().unwrap();
        // Wire (0, 1) became (0, J2), (J2, 1)
        assert_eq!(circuit.edges[0], Wire::from((0, 2)));
        assert_eq!(circuit.edges[1], Wire::from((2, 1)));
        // The battery still leaves through J2 and is re-entered from ground
        let battery = circuit.component(ComponentId(0));
        assert_eq!(battery.connection(1), Some(ComponentId(2)));
        assert_eq!(battery.connection(0), Some(ComponentId(3)));
    }

    #[test]
    fn test_add_nulls_between_junctions() {
        let mut circuit = Circuit::from_parts(
            vec![
                Component::battery(10.0),
                Component::junction(3),
                Component::junction(3),
                Component::resistor(10.0),
                Component::resistor(10.0),
            ],
            vec![
                Wire::from((0, 1)),
                Wire::from((1, 2)),
                Wire::from((1, 3)),
                Wire::from((3, 2)),
                Wire::from((2, 4)),
                Wire::from((4, 0)),
            ],
        );
        circuit.normalize().unwrap();

        let nulls: Vec<_> = circuit
            .vertices
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Null))
            .collect();
        assert_eq!(nulls.len(), 1);

        for wire in &circuit.edges {
            let both_junctions = circuit.component(wire.start).is_junction()
                && circuit.component(wire.end).is_junction();
            assert!(!both_junctions, "junctions wired directly: {wire}");
        }
    }

    /// Pre-existing junctions wired to each other, so normalization adds nulls.
    fn bridge() -> Circuit {
        Circuit::from_parts(
            vec![
                Component::battery(100.0),
                Component::junction(3),
                Component::junction(3),
                Component::resistor(50.0),
                Component::resistor(50.0),
                Component::resistor(50.0),
                Component::junction(3),
                Component::junction(3),
            ],
            [(0, 1), (1, 2), (2, 4), (2, 5), (4, 6), (5, 6), (6, 7), (1, 3), (3, 7), (0, 7)]
                .into_iter()
                .map(Wire::from)
                .collect(),
        )
    }

    #[test]
    fn test_normalize_is_a_fixed_point() {
        let mut circuit = series_loop();
        circuit.normalize().unwrap();
        let (vertices, edges) = (circuit.len(), circuit.edges.len());

        circuit.normalize().unwrap();
        assert_eq!(circuit.len(), vertices);
        assert_eq!(circuit.edges.len(), edges);
        assert_eq!(circuit.vertices.iter().filter(|c| c.is_ground()).count(), 1);
    }

    #[test]
    fn test_normalize_bridge_is_a_fixed_point() {
        let mut circuit = bridge();
        circuit.normalize().unwrap();
        let nulls = |c: &Circuit| {
            c.vertices
                .iter()
                .filter(|v| matches!(v.kind, ComponentKind::Null))
                .count()
        };
        assert_eq!(nulls(&circuit), 2);
        let edges = circuit.edges.clone();
        let ground = circuit.ground();
        let slots: Vec<Vec<ComponentId>> = circuit
            .vertices
            .iter()
            .map(|c| c.connections().collect())
            .collect();

        circuit.normalize().unwrap();
        assert_eq!(nulls(&circuit), 2);
        assert_eq!(circuit.edges, edges);
        assert_eq!(circuit.ground(), ground);
        for (component, before) in circuit.vertices.iter().zip(&slots) {
            assert_eq!(&component.connections().collect::<Vec<_>>(), before);
        }
    }

    #[test]
    fn test_existing_junction_becomes_ground() {
        let mut circuit = Circuit::from_parts(
            vec![
                Component::battery(10.0),
                Component::junction(2),
                Component::resistor(10.0),
            ],
            vec![Wire::from((0, 1)), Wire::from((1, 2)), Wire::from((2, 0))],
        );
        circuit.normalize().unwrap();
        // The wire (2, 0) is split, and the new junction is preferred
        assert_eq!(circuit.ground(), Some(ComponentId(3)));
        assert!(!circuit.component(ComponentId(1)).is_ground());
    }

    #[test]
    fn test_wire_vertices_are_absorbed() {
        let mut circuit = Circuit::from_parts(
            vec![Component::battery(10.0), Component::wire(), Component::resistor(10.0)],
            vec![Wire::from((0, 1)), Wire::from((1, 2)), Wire::from((2, 0))],
        );
        circuit.normalize().unwrap();
        assert!(circuit
            .vertices
            .iter()
            .all(|c| !matches!(c.kind, ComponentKind::Wire)));
        assert!(circuit.component(ComponentId(1)).is_junction());
    }

    #[test]
    fn test_bad_edge_leaves_circuit_untouched() {
        let mut circuit = Circuit::from_parts(
            vec![Component::battery(10.0), Component::resistor(10.0)],
            vec![Wire::from((0, 1)), Wire::from((1, 5))],
        );
        let err = circuit.normalize().unwrap_err();
        assert!(err.is_topology());
        assert!(matches!(err, VoltaicError::EdgeOutOfRange { index: 5, .. }));
        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.edges.len(), 2);
    }

    #[test]
    fn test_passes_reject_bad_edges() {
        let bad = || {
            Circuit::from_parts(
                vec![Component::battery(10.0), Component::resistor(10.0)],
                vec![Wire::from((0, 1)), Wire::from((1, 5))],
            )
        };

        let mut circuit = bad();
        let err = circuit.add_junctions().unwrap_err();
        assert!(matches!(err, VoltaicError::EdgeOutOfRange { index: 5, .. }));
        assert_eq!(circuit.len(), 2);

        let mut circuit = bad();
        let err = circuit.add_nulls().unwrap_err();
        assert!(matches!(err, VoltaicError::EdgeOutOfRange { index: 5, .. }));
        assert_eq!(circuit.edges.len(), 2);
    }
}
