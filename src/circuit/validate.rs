//! Circuit validation.
//!
//! Three gates run before any simulation:
//! - [`check_topology`]: every wire is in range, every slot is filled,
//!   exactly one ground junction exists.
//! - [`check_parameters`]: every component value is inside its allowed range.
//! - [`validate_circuit`]: at least one EMF source sits on a closed loop with
//!   strictly positive resistance.

use tracing::{debug, warn};

use super::graph::Circuit;
use super::search::find_loop;
use super::types::ComponentId;
use crate::components::{ComponentKind, MAX_JUNCTION_SLOTS, MIN_JUNCTION_SLOTS};
use crate::error::{Result, VoltaicError};

/// Resistance range for resistors and light bulbs (ohms).
pub const RESISTANCE_RANGE: (f64, f64) = (1e-6, 1e4);
/// Battery voltage range (volts).
pub const BATTERY_VOLTAGE_RANGE: (f64, f64) = (1e-3, 1e4);
/// Light bulb wattage range (watts).
pub const WATTAGE_RANGE: (f64, f64) = (1e-6, 1e6);
/// Capacitance range (farads).
pub const CAPACITANCE_RANGE: (f64, f64) = (1e-9, 1e-2);
/// Initial capacitor voltage range (volts).
pub const CAPACITOR_VOLTAGE_RANGE: (f64, f64) = (0.0, 1e3);

/// Check the structural invariants of a normalized circuit.
pub fn check_topology(circuit: &Circuit) -> Result<()> {
    if circuit.is_empty() {
        return Err(VoltaicError::topology("Circuit has no components"));
    }

    circuit.check_edges()?;

    for component in &circuit.vertices {
        if matches!(component.kind, ComponentKind::Wire) {
            return Err(VoltaicError::topology(format!(
                "Wire vertex '{}' was not normalized into a junction",
                component.name
            )));
        }
        let connected = component.connection_count();
        if connected < component.slots() {
            return Err(VoltaicError::IncompleteConnections {
                component: component.name.clone(),
                connected,
                required: component.slots(),
            });
        }
        if connected > component.slots() {
            return Err(VoltaicError::OverConnected {
                component: component.name.clone(),
                connected,
                slots: component.slots(),
            });
        }
    }

    match circuit.vertices.iter().filter(|c| c.is_ground()).count() {
        0 => Err(VoltaicError::MissingGround),
        1 => Ok(()),
        count => Err(VoltaicError::MultipleGrounds { count }),
    }
}

fn check_range(name: &str, param: &str, value: f64, (lo, hi): (f64, f64)) -> Result<()> {
    if !value.is_finite() {
        return Err(VoltaicError::param(name, param, "value must be finite"));
    }
    if value < lo || value > hi {
        return Err(VoltaicError::param(
            name,
            param,
            format!("{value} is outside [{lo}, {hi}]"),
        ));
    }
    Ok(())
}

/// Check every component's parameters against its allowed range.
pub fn check_parameters(circuit: &Circuit) -> Result<()> {
    for component in &circuit.vertices {
        let name = component.name.as_str();
        match &component.kind {
            ComponentKind::Resistor => {
                check_range(name, "resistance", component.res, RESISTANCE_RANGE)?;
            }
            ComponentKind::Battery => {
                check_range(name, "voltage", component.emf, BATTERY_VOLTAGE_RANGE)?;
                check_range(name, "internal_resistance", component.res, (0.0, RESISTANCE_RANGE.1))?;
            }
            ComponentKind::LightBulb(bulb) => {
                check_range(name, "resistance", component.res, RESISTANCE_RANGE)?;
                check_range(name, "wattage", bulb.wattage, WATTAGE_RANGE)?;
            }
            ComponentKind::Capacitor(cap) => {
                check_range(name, "capacitance", cap.capacitance, CAPACITANCE_RANGE)?;
                check_range(name, "voltage", cap.voltage(), CAPACITOR_VOLTAGE_RANGE)?;
            }
            ComponentKind::Junction(_) => {
                let slots = component.slots();
                if !(MIN_JUNCTION_SLOTS..=MAX_JUNCTION_SLOTS).contains(&slots) {
                    return Err(VoltaicError::param(
                        name,
                        "num_cxns",
                        format!(
                            "{slots} is outside [{MIN_JUNCTION_SLOTS}, {MAX_JUNCTION_SLOTS}]"
                        ),
                    ));
                }
            }
            ComponentKind::Wire
            | ComponentKind::Null
            | ComponentKind::Multimeter(_)
            | ComponentKind::Switch(_) => {}
        }
    }
    Ok(())
}

/// Minimum loop resistance for every EMF source (`None` where no loop exists).
pub fn loop_report(circuit: &Circuit) -> Vec<(ComponentId, Option<f64>)> {
    circuit
        .emf_sources()
        .into_iter()
        .map(|id| {
            let resistance = find_loop(circuit, id);
            debug!(source = %circuit.component(id).name, ?resistance, "loop search finished");
            (id, resistance)
        })
        .collect()
}

/// Validate a normalized circuit for simulation.
///
/// Returns `Ok(false)` when no EMF source lies on a closed loop with
/// positive resistance (no current could ever flow, or a source is
/// shorted). Topology violations are errors.
pub fn validate_circuit(circuit: &Circuit) -> Result<bool> {
    check_topology(circuit)?;

    let valid = loop_report(circuit)
        .iter()
        .any(|(_, resistance)| resistance.is_some_and(|r| r > 0.0));

    if !valid {
        warn!("no EMF source lies on a closed loop with non-zero resistance");
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Wire;
    use crate::components::Component;

    fn normalized(vertices: Vec<Component>, edges: &[(usize, usize)]) -> Circuit {
        let mut circuit =
            Circuit::from_parts(vertices, edges.iter().copied().map(Wire::from).collect());
        circuit.normalize().unwrap();
        circuit
    }

    #[test]
    fn test_series_loop_is_valid() {
        let circuit = normalized(
            vec![Component::battery(12.0), Component::resistor(5.0)],
            &[(0, 1), (1, 0)],
        );
        assert!(validate_circuit(&circuit).unwrap());
    }

    #[test]
    fn test_disjoint_loops_are_each_found() {
        let circuit = normalized(
            vec![
                Component::battery(12.0),
                Component::resistor(5.0),
                Component::battery(6.0),
                Component::resistor(3.0),
            ],
            &[(0, 1), (1, 0), (2, 3), (3, 2)],
        );
        assert!(validate_circuit(&circuit).unwrap());
        let report = loop_report(&circuit);
        assert_eq!(report, vec![(ComponentId(0), Some(5.0)), (ComponentId(2), Some(3.0))]);
    }

    #[test]
    fn test_shorted_battery_is_invalid() {
        let circuit = normalized(
            vec![Component::battery(12.0), Component::multimeter(crate::components::MeterMode::Ammeter)],
            &[(0, 1), (1, 0)],
        );
        assert!(!validate_circuit(&circuit).unwrap());
    }

    #[test]
    fn test_isolated_component_fails_topology() {
        let circuit = normalized(
            vec![
                Component::battery(12.0),
                Component::resistor(5.0),
                Component::resistor(8.0),
            ],
            &[(0, 1), (1, 0)],
        );
        let err = validate_circuit(&circuit).unwrap_err();
        assert!(matches!(
            err,
            VoltaicError::IncompleteConnections { connected: 0, required: 2, .. }
        ));
    }

    #[test]
    fn test_over_connected_component_fails_topology() {
        let circuit = normalized(
            vec![
                Component::battery(12.0),
                Component::resistor(5.0),
                Component::resistor(8.0),
            ],
            &[(0, 1), (1, 0), (0, 2), (2, 1)],
        );
        assert!(matches!(
            check_topology(&circuit),
            Err(VoltaicError::OverConnected { .. })
        ));
    }

    #[test]
    fn test_parameter_bounds() {
        let circuit = Circuit::from_parts(vec![Component::resistor(5.0)], vec![]);
        assert!(check_parameters(&circuit).is_ok());

        let circuit = Circuit::from_parts(vec![Component::resistor(0.0)], vec![]);
        assert!(matches!(
            check_parameters(&circuit),
            Err(VoltaicError::InvalidParameter { ref param, .. }) if param == "resistance"
        ));

        let circuit = Circuit::from_parts(vec![Component::capacitor(0.0, 0.0)], vec![]);
        assert!(check_parameters(&circuit).is_err());

        let circuit = Circuit::from_parts(vec![Component::battery(f64::NAN)], vec![]);
        assert!(check_parameters(&circuit).is_err());

        let circuit = Circuit::from_parts(vec![Component::junction(6)], vec![]);
        assert!(check_parameters(&circuit).is_err());
    }

    #[test]
    fn test_missing_and_multiple_grounds() {
        let mut circuit = Circuit::from_parts(
            vec![Component::battery(12.0), Component::junction(2), Component::resistor(5.0), Component::junction(2)],
            vec![
                Wire::from((0, 1)),
                Wire::from((1, 2)),
                Wire::from((2, 3)),
                Wire::from((3, 0)),
            ],
        );
        assert!(matches!(check_topology(&circuit), Err(VoltaicError::MissingGround)));

        circuit.vertices[1].mark_ground();
        circuit.vertices[3].mark_ground();
        assert!(matches!(
            check_topology(&circuit),
            Err(VoltaicError::MultipleGrounds { count: 2 })
        ));
    }
}
