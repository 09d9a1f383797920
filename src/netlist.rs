//! JSON circuit descriptions.
//!
//! A description is the plain vertex/edge pair that crosses the library
//! boundary: an ordered list of tagged component records and an ordered list
//! of `[start, end]` index pairs.
//!
//! ```json
//! {
//!   "vertices": [
//!     { "type": "battery", "voltage": 12.0 },
//!     { "type": "resistor", "resistance": 5.0, "name": "load" }
//!   ],
//!   "edges": [[0, 1], [1, 0]]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Wire};
use crate::components::{Component, ComponentKind, MeterMode};
use crate::error::{Result, VoltaicError};

fn default_junction_slots() -> usize {
    3
}

fn default_closed() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Parameters of one component, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentSpec {
    Wire,
    Junction {
        #[serde(default = "default_junction_slots")]
        slots: usize,
        #[serde(default, skip_serializing_if = "is_false")]
        ground: bool,
    },
    Null,
    Battery {
        voltage: f64,
        #[serde(default)]
        internal_resistance: f64,
    },
    Resistor {
        resistance: f64,
    },
    LightBulb {
        resistance: f64,
        wattage: f64,
    },
    Capacitor {
        capacitance: f64,
        /// Voltage across the plates when the simulation starts
        #[serde(default)]
        voltage: f64,
    },
    Multimeter {
        #[serde(default)]
        mode: MeterMode,
    },
    Switch {
        #[serde(default = "default_closed")]
        closed: bool,
    },
}

/// One vertex: an optional label plus the component parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub component: ComponentSpec,
}

/// A whole circuit as plain vertices and edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub vertices: Vec<VertexSpec>,
    pub edges: Vec<(usize, usize)>,
}

impl From<&VertexSpec> for Component {
    fn from(spec: &VertexSpec) -> Self {
        let component = match spec.component {
            ComponentSpec::Wire => Component::wire(),
            ComponentSpec::Junction { slots, ground } => {
                let mut junction = Component::junction(slots);
                if ground {
                    junction.mark_ground();
                }
                junction
            }
            ComponentSpec::Null => Component::null(),
            ComponentSpec::Battery {
                voltage,
                internal_resistance,
            } => Component::battery_with_resistance(voltage, internal_resistance),
            ComponentSpec::Resistor { resistance } => Component::resistor(resistance),
            ComponentSpec::LightBulb {
                resistance,
                wattage,
            } => Component::light_bulb(resistance, wattage),
            ComponentSpec::Capacitor {
                capacitance,
                voltage,
            } => Component::capacitor(capacitance, voltage),
            ComponentSpec::Multimeter { mode } => Component::multimeter(mode),
            ComponentSpec::Switch { closed } => Component::switch(closed),
        };
        match &spec.name {
            Some(name) => component.named(name.clone()),
            None => component,
        }
    }
}

impl From<&Component> for VertexSpec {
    fn from(component: &Component) -> Self {
        let spec = match &component.kind {
            ComponentKind::Wire => ComponentSpec::Wire,
            ComponentKind::Junction(j) => ComponentSpec::Junction {
                slots: component.slots(),
                ground: j.ground,
            },
            ComponentKind::Null => ComponentSpec::Null,
            ComponentKind::Battery => ComponentSpec::Battery {
                voltage: component.emf,
                internal_resistance: component.res,
            },
            ComponentKind::Resistor => ComponentSpec::Resistor {
                resistance: component.res,
            },
            ComponentKind::LightBulb(bulb) => ComponentSpec::LightBulb {
                resistance: component.res,
                wattage: bulb.wattage,
            },
            ComponentKind::Capacitor(cap) => ComponentSpec::Capacitor {
                capacitance: cap.capacitance,
                voltage: cap.voltage(),
            },
            ComponentKind::Multimeter(meter) => ComponentSpec::Multimeter { mode: meter.mode },
            ComponentKind::Switch(switch) => ComponentSpec::Switch {
                closed: switch.closed,
            },
        };
        VertexSpec {
            name: Some(component.name.clone()).filter(|n| !n.is_empty()),
            component: spec,
        }
    }
}

impl CircuitDescription {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a description from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| VoltaicError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the description to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write_error = |source| VoltaicError::FileWriteError {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(write_error)?;
        Ok(())
    }

    /// Describe an existing circuit (e.g. the normalized graph).
    pub fn from_circuit(circuit: &Circuit) -> Self {
        Self {
            vertices: circuit.vertices.iter().map(VertexSpec::from).collect(),
            edges: circuit
                .edges
                .iter()
                .map(|w| (w.start.index(), w.end.index()))
                .collect(),
        }
    }

    /// Build the circuit. Edges are not range-checked here; normalization
    /// reports bad indices.
    pub fn to_circuit(&self) -> Circuit {
        Circuit::from_parts(
            self.vertices.iter().map(Component::from).collect(),
            self.edges.iter().copied().map(Wire::from).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ComponentId;

    const SERIES: &str = r#"{
        "vertices": [
            { "type": "battery", "voltage": 12.0 },
            { "type": "resistor", "resistance": 5.0, "name": "load" }
        ],
        "edges": [[0, 1], [1, 0]]
    }"#;

    #[test]
    fn test_parse_series_loop() {
        let desc = CircuitDescription::from_json(SERIES).unwrap();
        assert_eq!(desc.edges, vec![(0, 1), (1, 0)]);
        assert_eq!(
            desc.vertices[0].component,
            ComponentSpec::Battery {
                voltage: 12.0,
                internal_resistance: 0.0
            }
        );

        let circuit = desc.to_circuit();
        assert_eq!(circuit.component(ComponentId(0)).name, "B0");
        assert_eq!(circuit.component(ComponentId(1)).name, "load");
        assert_eq!(circuit.component(ComponentId(1)).res, 5.0);
        assert_eq!(circuit.find("load"), Some(ComponentId(1)));
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let desc = CircuitDescription::from_json(
            r#"{
                "vertices": [
                    { "type": "junction" },
                    { "type": "switch" },
                    { "type": "multimeter", "mode": "ammeter" },
                    { "type": "capacitor", "capacitance": 1e-4 }
                ],
                "edges": []
            }"#,
        )
        .unwrap();
        let kinds: Vec<_> = desc.vertices.iter().map(|v| v.component.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ComponentSpec::Junction {
                    slots: 3,
                    ground: false
                },
                ComponentSpec::Switch { closed: true },
                ComponentSpec::Multimeter {
                    mode: MeterMode::Ammeter
                },
                ComponentSpec::Capacitor {
                    capacitance: 1e-4,
                    voltage: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_normalized_graph_survives_json() {
        let mut circuit = CircuitDescription::from_json(SERIES).unwrap().to_circuit();
        circuit.normalize().unwrap();

        let json = CircuitDescription::from_circuit(&circuit).to_json().unwrap();
        let restored = CircuitDescription::from_json(&json).unwrap().to_circuit();

        assert_eq!(restored.len(), circuit.len());
        assert_eq!(restored.edges, circuit.edges);
        assert_eq!(restored.ground(), circuit.ground());
        assert_eq!(restored.component(ComponentId(2)).name, "J2");
    }

    #[test]
    fn test_malformed_descriptions_are_rejected() {
        let err = CircuitDescription::from_json(r#"{ "vertices": [{ "type": "flux_capacitor" }], "edges": [] }"#)
            .unwrap_err();
        assert!(matches!(err, VoltaicError::Json(_)));

        let err = CircuitDescription::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, VoltaicError::FileReadError { .. }));
    }
}
