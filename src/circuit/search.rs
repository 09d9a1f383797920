//! Closed-loop search around an EMF source.
//!
//! An explicit-stack depth-first search over simple cycles through the start
//! component. Each frame owns the node it stands on, the wire it arrived by,
//! the accumulated resistance and a cursor into that node's neighbour list.
//! Neighbours are tried lowest resistance first, so zero-resistance shorts
//! surface early; the search stops as soon as a zero-resistance loop is seen
//! and otherwise prunes any partial path that cannot beat the best loop so
//! far. Every simple path is visited at most once, so the search always
//! terminates with the minimum-resistance loop or `None`.

use super::graph::Circuit;
use super::types::ComponentId;

/// A closed loop found by [`find_loop_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoopPath {
    /// Total resistance of all non-junction components on the loop
    pub resistance: f64,
    /// Components on the loop, starting (and implicitly ending) at the source
    pub path: Vec<ComponentId>,
}

struct Frame {
    node: ComponentId,
    via_edge: Option<usize>,
    resistance: f64,
    cursor: usize,
}

/// Total resistance of the least-resistive closed loop through `start`, or
/// `None` if `start` lies on no closed conducting loop.
pub fn find_loop(circuit: &Circuit, start: ComponentId) -> Option<f64> {
    find_loop_path(circuit, start).map(|found| found.resistance)
}

/// Like [`find_loop`], but also returns the components on the loop.
pub fn find_loop_path(circuit: &Circuit, start: ComponentId) -> Option<LoopPath> {
    if start.0 >= circuit.len() || !circuit.component(start).conducts() {
        return None;
    }

    let mut adjacency = circuit.adjacency();
    for neighbours in &mut adjacency {
        neighbours.retain(|&(_, n)| circuit.component(n).conducts());
        neighbours.sort_by(|a, b| {
            circuit
                .component(a.1)
                .loop_resistance()
                .total_cmp(&circuit.component(b.1).loop_resistance())
        });
    }

    let mut on_path = vec![false; circuit.len()];
    let mut used_edges = vec![false; circuit.edges.len()];
    let mut best: Option<LoopPath> = None;

    on_path[start.0] = true;
    let mut stack = vec![Frame {
        node: start,
        via_edge: None,
        resistance: circuit.component(start).loop_resistance(),
        cursor: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let neighbours = &adjacency[frame.node.0];
        if frame.cursor >= neighbours.len() {
            // Dead end: backtrack
            if let Some(edge) = frame.via_edge {
                used_edges[edge] = false;
            }
            on_path[frame.node.0] = false;
            stack.pop();
            continue;
        }

        let (edge, next) = neighbours[frame.cursor];
        frame.cursor += 1;
        let resistance = frame.resistance;

        if used_edges[edge] {
            continue;
        }

        if next == start {
            if stack.len() > 1 && best.as_ref().map_or(true, |b| resistance < b.resistance) {
                best = Some(LoopPath {
                    resistance,
                    path: stack.iter().map(|f| f.node).collect(),
                });
                if resistance <= 0.0 {
                    break;
                }
            }
            continue;
        }

        if on_path[next.0] {
            continue;
        }

        let extended = resistance + circuit.component(next).loop_resistance();
        if best.as_ref().is_some_and(|b| extended >= b.resistance) {
            continue;
        }

        used_edges[edge] = true;
        on_path[next.0] = true;
        stack.push(Frame {
            node: next,
            via_edge: Some(edge),
            resistance: extended,
            cursor: 0,
        });
    }

    best
}
