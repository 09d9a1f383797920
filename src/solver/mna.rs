//! Matrix assembly and solving.

use std::collections::VecDeque;

use crate::circuit::{Circuit, ComponentId};
use crate::components::KvlRow;
use crate::error::{Result, VoltaicError};

/// Pivot magnitude below which the matrix is treated as singular.
const PIVOT_EPSILON: f64 = 1e-15;

/// Dense linear system Ax = z.
#[derive(Debug)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Solution vector x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of A
    pub lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pub pivots: Vec<usize>,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
        }
    }

    /// Clear the matrix and vectors to zero.
    pub fn clear(&mut self) {
        self.a.fill(0.0);
        self.z.fill(0.0);
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] = value;
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Perform LU decomposition with partial pivoting.
    ///
    /// On failure the error carries the column that had no usable pivot;
    /// the caller knows which component owns it.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;
        self.lu.copy_from_slice(&self.a);

        for i in 0..n {
            self.pivots[i] = i;
        }

        for k in 0..n {
            // Find pivot
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < PIVOT_EPSILON {
                return Err(self.singular(k));
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve the system using the pre-computed LU decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Apply pivot permutation to z
        for i in 0..n {
            self.x[i] = self.z[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
            let diag = self.lu[i * n + i];
            if diag.abs() < PIVOT_EPSILON {
                return Err(self.singular(i));
            }
            self.x[i] /= diag;
        }

        Ok(())
    }

    fn singular(&self, row: usize) -> VoltaicError {
        VoltaicError::SingularMatrix {
            size: self.size,
            row,
            component: format!("row {row}"),
        }
    }
}

/// Mapping between components and matrix rows.
///
/// Every component except ground owns one row and one column: a junction's
/// unknown is its potential, a two-terminal element's unknown is its branch
/// current. Connected sub-circuits that do not contain ground get a local
/// reference junction whose KCL row is replaced by `V = 0`; the dropped KCL
/// row is linearly dependent on the others in that sub-circuit.
#[derive(Debug, Clone)]
pub struct RowMap {
    rows: Vec<Option<usize>>,
    components: Vec<ComponentId>,
    references: Vec<bool>,
    ground: ComponentId,
}

impl RowMap {
    /// Build the mapping for a normalized circuit.
    pub fn new(circuit: &Circuit) -> Result<Self> {
        let ground = circuit.ground().ok_or(VoltaicError::MissingGround)?;

        let mut rows = vec![None; circuit.len()];
        let mut components = Vec::with_capacity(circuit.len().saturating_sub(1));
        for id in circuit.ids().filter(|&id| id != ground) {
            rows[id.0] = Some(components.len());
            components.push(id);
        }

        let references = floating_references(circuit, ground);

        Ok(Self {
            rows,
            components,
            references,
            ground,
        })
    }

    /// Matrix dimension (component count minus ground).
    pub fn size(&self) -> usize {
        self.components.len()
    }

    /// Row owned by a component; `None` for ground.
    pub fn row(&self, id: ComponentId) -> Option<usize> {
        self.rows.get(id.0).copied().flatten()
    }

    /// Component owning a row.
    pub fn component(&self, row: usize) -> ComponentId {
        self.components[row]
    }

    /// The ground junction.
    pub fn ground(&self) -> ComponentId {
        self.ground
    }

    /// Whether a junction serves as the 0 V reference of a floating sub-circuit.
    pub fn is_reference(&self, id: ComponentId) -> bool {
        self.references.get(id.0).copied().unwrap_or(false)
    }

    /// `(row, component)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ComponentId)> + '_ {
        self.components.iter().copied().enumerate()
    }
}

/// Flag one junction (the highest-indexed) in every conducting sub-circuit
/// that cannot reach ground.
///
/// Open elements fix only their own current, never a potential, so the
/// flood neither enters nor leaves them. A junction surrounded only by open
/// elements is a sub-circuit of its own.
fn floating_references(circuit: &Circuit, ground: ComponentId) -> Vec<bool> {
    let adjacency = circuit.adjacency();
    let mut seen: Vec<bool> = circuit.vertices.iter().map(|c| !c.conducts()).collect();
    let mut references = vec![false; circuit.len()];

    let flood = |from: ComponentId, seen: &mut Vec<bool>| -> Vec<ComponentId> {
        let mut members = Vec::new();
        let mut queue = VecDeque::from([from]);
        seen[from.0] = true;
        while let Some(id) = queue.pop_front() {
            members.push(id);
            for &(_, next) in &adjacency[id.0] {
                if !seen[next.0] {
                    seen[next.0] = true;
                    queue.push_back(next);
                }
            }
        }
        members
    };

    flood(ground, &mut seen);
    for id in circuit.ids() {
        if seen[id.0] {
            continue;
        }
        let members = flood(id, &mut seen);
        if let Some(reference) = members
            .iter()
            .copied()
            .filter(|&m| circuit.component(m).is_junction())
            .max()
        {
            references[reference.0] = true;
        }
    }
    references
}

/// Assemble the KCL/KVL system for one step.
///
/// Junction rows: sum of signed branch currents = 0 (+1 for a neighbour whose
/// slot 1 is this junction, -1 for slot 0).
/// Element rows: -V(slot 0) + V(slot 1) + R * I = E, or I = 0 when open.
/// Ground has no column, so its terms are simply omitted.
pub fn assemble(circuit: &Circuit, rows: &RowMap, matrix: &mut MnaMatrix) {
    matrix.clear();

    for (row, id) in rows.iter() {
        let component = circuit.component(id);

        if rows.is_reference(id) {
            matrix.set(row, row, 1.0);
            continue;
        }

        match component.kvl_row() {
            None => {
                for neighbour in component.connections() {
                    let sign = circuit.component(neighbour).kcl_sign(id);
                    if let Some(col) = rows.row(neighbour) {
                        matrix.add(row, col, sign);
                    }
                }
            }
            Some(KvlRow::Open) => {
                matrix.set(row, row, 1.0);
            }
            Some(KvlRow::Branch { resistance, emf }) => {
                matrix.add(row, row, resistance);
                if let Some(col) = component.connection(0).and_then(|n| rows.row(n)) {
                    matrix.add(row, col, -1.0);
                }
                if let Some(col) = component.connection(1).and_then(|n| rows.row(n)) {
                    matrix.add(row, col, 1.0);
                }
                matrix.add_source(row, emf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Wire;
    use crate::components::Component;
    use approx::assert_relative_eq;

    #[test]
    fn test_lu_solve_small_system() {
        // [2 1] [x]   [3]
        // [1 3] [y] = [5]
        let mut m = MnaMatrix::new(2);
        m.set(0, 0, 2.0);
        m.set(0, 1, 1.0);
        m.set(1, 0, 1.0);
        m.set(1, 1, 3.0);
        m.add_source(0, 3.0);
        m.add_source(1, 5.0);
        m.factor().unwrap();
        m.solve().unwrap();
        assert_relative_eq!(m.x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(m.x[1], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix_is_reported() {
        let mut m = MnaMatrix::new(2);
        m.set(0, 0, 1.0);
        m.set(0, 1, 2.0);
        m.set(1, 0, 2.0);
        m.set(1, 1, 4.0);
        assert!(matches!(
            m.factor(),
            Err(VoltaicError::SingularMatrix { size: 2, row: 1, .. })
        ));
    }

    #[test]
    fn test_assemble_series_loop() {
        let mut circuit = Circuit::from_parts(
            vec![Component::battery(12.0), Component::resistor(5.0)],
            vec![Wire::from((0, 1)), Wire::from((1, 0))],
        );
        circuit.normalize().unwrap();
        // B0, R1, J2, GND3
        let rows = RowMap::new(&circuit).unwrap();
        assert_eq!(rows.size(), 3);
        assert_eq!(rows.row(ComponentId(3)), None);

        let mut m = MnaMatrix::new(rows.size());
        assemble(&circuit, &rows, &mut m);

        // Battery: ground -> J2, so V(J2) = 12
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.z[0], 12.0);
        // Resistor: J2 -> ground, so -V(J2) + 5 I = 0
        assert_eq!(m.get(1, 1), 5.0);
        assert_eq!(m.get(1, 2), -1.0);
        // J2 KCL: battery current arrives, resistor current leaves
        assert_eq!(m.get(2, 0), 1.0);
        assert_eq!(m.get(2, 1), -1.0);
    }

    #[test]
    fn test_floating_sub_circuit_gets_reference() {
        let mut circuit = Circuit::from_parts(
            vec![
                Component::battery(12.0),
                Component::resistor(5.0),
                Component::battery(6.0),
                Component::resistor(3.0),
            ],
            vec![
                Wire::from((0, 1)),
                Wire::from((1, 0)),
                Wire::from((2, 3)),
                Wire::from((3, 2)),
            ],
        );
        circuit.normalize().unwrap();
        let rows = RowMap::new(&circuit).unwrap();
        // Ground is J7 (second loop); the first loop's highest junction is J5
        assert_eq!(rows.ground(), ComponentId(7));
        assert!(rows.is_reference(ComponentId(5)));
        assert!(!rows.is_reference(ComponentId(4)));
        assert!(!rows.is_reference(ComponentId(6)));
    }

    #[test]
    fn test_open_bridge_does_not_join_sub_circuits() {
        let mut circuit = Circuit::from_parts(
            vec![
                Component::battery(12.0),
                Component::resistor(5.0),
                Component::switch(false),
                Component::battery(6.0),
                Component::resistor(3.0),
            ],
            vec![
                Wire::from((0, 1)),
                Wire::from((1, 2)),
                Wire::from((2, 0)),
                Wire::from((3, 4)),
                Wire::from((4, 3)),
            ],
        );
        circuit.normalize().unwrap();
        let rows = RowMap::new(&circuit).unwrap();
        // Only one sub-circuit holds ground; the other gets its own reference
        let references = circuit.ids().filter(|&id| rows.is_reference(id)).count();
        assert_eq!(references, 1);
        assert!(!rows.is_reference(rows.ground()));
        assert!(circuit
            .ids()
            .filter(|&id| rows.is_reference(id))
            .all(|id| circuit.component(id).is_junction()));
    }
}
