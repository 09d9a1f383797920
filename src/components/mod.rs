//! Component models for circuit simulation.
//!
//! This module provides models for all supported circuit elements:
//! - Sources: DC battery, Capacitor (as a charging EMF)
//! - Passive: Resistor, Light bulb
//! - Controls: Switch
//! - Instruments: Multimeter (voltmeter / ammeter)
//! - Topology: Wire, Junction, Null component
//!
//! Every element shares the electrical state in [`Component`]; the
//! per-variant data and behaviour live in [`ComponentKind`]. The solver never
//! inspects the variant directly, it asks for a [`KvlRow`] or a KCL sign.

mod controls;
mod linear;
mod meters;
mod nodes;

pub use controls::Switch;
pub use linear::{BulbState, Capacitor, LightBulb, WATTAGE_TOLERANCE};
pub use meters::{MeterMode, Multimeter};
pub use nodes::{Junction, MAX_JUNCTION_SLOTS, MIN_JUNCTION_SLOTS};

use serde::Serialize;

use crate::circuit::ComponentId;

/// Time series recorded for a component, one sample per solved step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
    /// Only filled for capacitors
    pub charge: Vec<f64>,
}

impl History {
    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.voltage.clear();
        self.current.clear();
        self.charge.clear();
    }
}

/// Variant tag plus variant-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Bare conductor; absorbed into a junction during normalization.
    Wire,
    Junction(Junction),
    /// Zero-valued placeholder between two directly wired junctions.
    Null,
    Battery,
    Resistor,
    LightBulb(LightBulb),
    Capacitor(Capacitor),
    Multimeter(Multimeter),
    Switch(Switch),
}

impl ComponentKind {
    /// Short prefix used to build component labels.
    pub fn prefix(&self) -> &'static str {
        match self {
            ComponentKind::Wire => "W",
            ComponentKind::Junction(j) if j.ground => "GND",
            ComponentKind::Junction(_) => "J",
            ComponentKind::Null => "N",
            ComponentKind::Battery => "B",
            ComponentKind::Resistor => "R",
            ComponentKind::LightBulb(_) => "L",
            ComponentKind::Capacitor(_) => "C",
            ComponentKind::Multimeter(m) if m.is_voltmeter() => "VM",
            ComponentKind::Multimeter(_) => "AM",
            ComponentKind::Switch(_) => "SW",
        }
    }
}

/// The KVL equation a two-terminal element contributes for its own row.
///
/// With `V0`/`V1` the potentials at connection slots 0 and 1 and `I` the
/// branch current (positive from slot 0 to slot 1):
///   `Branch`: -V0 + V1 + resistance * I = emf
///   `Open`:   I = 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KvlRow {
    Branch { resistance: f64, emf: f64 },
    Open,
}

/// A circuit element.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
    /// Voltage: node potential for junctions, voltage across for elements
    pub emf: f64,
    /// Current: branch current for elements, throughput for junctions
    pub curr: f64,
    /// Resistance (internal resistance for batteries)
    pub res: f64,
    connections: Vec<Option<ComponentId>>,
    /// Neighbours beyond the slot count, kept so validation can report them
    extra: Vec<ComponentId>,
    pub history: History,
}

/// Slot a wire's end lands in on a two-terminal element.
pub const INPUT_SLOT: usize = 0;
/// Slot a wire's start lands in on a two-terminal element.
pub const OUTPUT_SLOT: usize = 1;

impl Component {
    fn with_kind(kind: ComponentKind, emf: f64, res: f64, slots: usize) -> Self {
        Self {
            name: String::new(),
            kind,
            emf,
            curr: 0.0,
            res,
            connections: vec![None; slots],
            extra: Vec::new(),
            history: History::default(),
        }
    }

    /// A bare wire vertex.
    pub fn wire() -> Self {
        Self::with_kind(ComponentKind::Wire, 0.0, 0.0, 2)
    }

    /// A junction with the given number of connection slots.
    pub fn junction(slots: usize) -> Self {
        Self::with_kind(ComponentKind::Junction(Junction::new()), 0.0, 0.0, slots)
    }

    /// A null component.
    pub fn null() -> Self {
        Self::with_kind(ComponentKind::Null, 0.0, 0.0, 2)
    }

    /// An ideal DC battery. Connection slot 1 is the positive terminal.
    pub fn battery(voltage: f64) -> Self {
        Self::battery_with_resistance(voltage, 0.0)
    }

    /// A DC battery with internal resistance.
    pub fn battery_with_resistance(voltage: f64, internal_resistance: f64) -> Self {
        Self::with_kind(ComponentKind::Battery, voltage, internal_resistance, 2)
    }

    /// A resistor.
    pub fn resistor(resistance: f64) -> Self {
        Self::with_kind(ComponentKind::Resistor, 0.0, resistance, 2)
    }

    /// A light bulb with resistance and rated wattage.
    pub fn light_bulb(resistance: f64, wattage: f64) -> Self {
        Self::with_kind(
            ComponentKind::LightBulb(LightBulb::new(wattage)),
            0.0,
            resistance,
            2,
        )
    }

    /// A capacitor, initially charged to `initial_voltage`.
    pub fn capacitor(capacitance: f64, initial_voltage: f64) -> Self {
        let cap = Capacitor::new(capacitance, initial_voltage);
        let emf = cap.voltage();
        Self::with_kind(ComponentKind::Capacitor(cap), emf, 0.0, 2)
    }

    /// A multimeter in the given mode.
    pub fn multimeter(mode: MeterMode) -> Self {
        Self::with_kind(ComponentKind::Multimeter(Multimeter::new(mode)), 0.0, 0.0, 2)
    }

    /// A switch.
    pub fn switch(closed: bool) -> Self {
        Self::with_kind(ComponentKind::Switch(Switch::new(closed)), 0.0, 0.0, 2)
    }

    /// Builder-style name assignment.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ============ Connection slots ============

    /// Number of connection slots.
    pub fn slots(&self) -> usize {
        self.connections.len()
    }

    /// Neighbours in slot order (plus any over-connected extras).
    pub fn connections(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.connections
            .iter()
            .flatten()
            .copied()
            .chain(self.extra.iter().copied())
    }

    /// Number of attached neighbours.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().flatten().count() + self.extra.len()
    }

    /// Neighbour in `slot`, or `None` while the slot is unfilled.
    pub fn connection(&self, slot: usize) -> Option<ComponentId> {
        self.connections.get(slot).copied().flatten()
    }

    /// Whether every slot holds a neighbour.
    pub fn is_fully_connected(&self) -> bool {
        self.connections.iter().all(Option::is_some)
    }

    /// Attach a neighbour in `preferred` if it is free, else in the first
    /// free slot. Over-filling is recorded rather than dropped so topology
    /// validation can report it.
    pub(crate) fn attach(&mut self, id: ComponentId, preferred: usize) {
        let slot = match self.connections.get(preferred) {
            Some(None) => Some(preferred),
            _ => self.connections.iter().position(Option::is_none),
        };
        match slot {
            Some(slot) => self.connections[slot] = Some(id),
            None => self.extra.push(id),
        }
    }

    pub(crate) fn clear_connections(&mut self) {
        self.connections.fill(None);
        self.extra.clear();
    }

    // ============ Classification ============

    /// Whether this is a junction (ground included).
    pub fn is_junction(&self) -> bool {
        matches!(self.kind, ComponentKind::Junction(_))
    }

    /// Whether this is the ground junction.
    pub fn is_ground(&self) -> bool {
        matches!(self.kind, ComponentKind::Junction(ref j) if j.ground)
    }

    /// Whether this is a two-terminal element (anything but wires and junctions).
    pub fn is_two_terminal(&self) -> bool {
        !matches!(self.kind, ComponentKind::Junction(_) | ComponentKind::Wire)
    }

    /// Whether this element supplies an electromotive force.
    pub fn is_emf_source(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::Battery | ComponentKind::Capacitor(_)
        )
    }

    /// Whether this is a capacitor.
    pub fn is_capacitor(&self) -> bool {
        matches!(self.kind, ComponentKind::Capacitor(_))
    }

    /// Whether current can pass through this component.
    pub fn conducts(&self) -> bool {
        !matches!(self.kvl_row(), Some(KvlRow::Open))
    }

    /// Resistance counted by loop validation (junctions and wires contribute none).
    pub fn loop_resistance(&self) -> f64 {
        if self.is_two_terminal() {
            self.res
        } else {
            0.0
        }
    }

    pub(crate) fn mark_ground(&mut self) {
        if let ComponentKind::Junction(ref mut j) = self.kind {
            j.ground = true;
        }
    }

    /// Turn a wire vertex into an equivalent two-slot junction.
    pub(crate) fn absorb_wire(&mut self) {
        if matches!(self.kind, ComponentKind::Wire) {
            self.kind = ComponentKind::Junction(Junction::new());
        }
    }

    // ============ Matrix assembly ============

    /// KVL contribution of a two-terminal element; `None` for junctions.
    pub fn kvl_row(&self) -> Option<KvlRow> {
        match &self.kind {
            ComponentKind::Wire | ComponentKind::Junction(_) => None,
            ComponentKind::Battery => Some(KvlRow::Branch {
                resistance: self.res,
                emf: self.emf,
            }),
            // A charged capacitor opposes the current that charges it.
            ComponentKind::Capacitor(_) => Some(KvlRow::Branch {
                resistance: self.res,
                emf: -self.emf,
            }),
            ComponentKind::Resistor | ComponentKind::LightBulb(_) => Some(KvlRow::Branch {
                resistance: self.res,
                emf: 0.0,
            }),
            ComponentKind::Null => Some(KvlRow::Branch {
                resistance: 0.0,
                emf: 0.0,
            }),
            ComponentKind::Multimeter(m) => match m.mode {
                MeterMode::Voltmeter => Some(KvlRow::Open),
                MeterMode::Ammeter => Some(KvlRow::Branch {
                    resistance: 0.0,
                    emf: 0.0,
                }),
            },
            ComponentKind::Switch(s) if s.closed => Some(KvlRow::Branch {
                resistance: 0.0,
                emf: 0.0,
            }),
            ComponentKind::Switch(_) => Some(KvlRow::Open),
        }
    }

    /// Sign with which this element's current enters `node`'s KCL row:
    /// +1 when `node` is slot 1 (current flows in), -1 when it is slot 0.
    pub fn kcl_sign(&self, node: ComponentId) -> f64 {
        if !self.is_two_terminal() {
            return 0.0;
        }
        let mut sign = 0.0;
        if self.connection(0) == Some(node) {
            sign -= 1.0;
        }
        if self.connection(1) == Some(node) {
            sign += 1.0;
        }
        sign
    }

    // ============ Post-solve bookkeeping ============

    /// Derive the voltage across a resistive element from its solved current.
    pub(crate) fn settle(&mut self) {
        if matches!(self.kind, ComponentKind::Resistor | ComponentKind::LightBulb(_)) {
            self.emf = self.curr * self.res;
        }
    }

    /// Carry time-dependent state into the next step. Only capacitors have
    /// any: their charge integrates the branch current over `dt`.
    pub(crate) fn advance(&mut self, dt: f64) {
        if let ComponentKind::Capacitor(c) = &mut self.kind {
            self.emf = c.integrate(self.curr, dt);
        }
    }

    /// Refresh instrument readings and indicator state. Must run after every
    /// other component has settled for the step.
    pub(crate) fn update_display(&mut self, across: f64) {
        let power = self.power();
        match &mut self.kind {
            ComponentKind::Multimeter(m) => {
                m.reading = match m.mode {
                    MeterMode::Voltmeter => across,
                    MeterMode::Ammeter => self.curr,
                };
                self.emf = across;
            }
            ComponentKind::LightBulb(b) => {
                b.update_state(power);
            }
            ComponentKind::Switch(_) | ComponentKind::Null => {
                self.emf = across;
            }
            _ => {}
        }
    }

    /// Append the current values to the history.
    pub(crate) fn record(&mut self) {
        self.history.voltage.push(self.emf);
        self.history.current.push(self.curr);
        if let ComponentKind::Capacitor(c) = &self.kind {
            self.history.charge.push(c.charge);
        }
    }

    /// Power dissipated (or delivered, for sources) at the current step.
    pub fn power(&self) -> f64 {
        self.emf * self.curr
    }

    /// Multimeter reading, if this is a multimeter.
    pub fn reading(&self) -> Option<f64> {
        match &self.kind {
            ComponentKind::Multimeter(m) => Some(m.reading),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kcl_sign_follows_slot_order() {
        let mut r = Component::resistor(5.0);
        r.attach(ComponentId(4), OUTPUT_SLOT);
        r.attach(ComponentId(3), INPUT_SLOT);
        assert_eq!(r.kcl_sign(ComponentId(3)), -1.0);
        assert_eq!(r.kcl_sign(ComponentId(4)), 1.0);
        assert_eq!(r.kcl_sign(ComponentId(9)), 0.0);
    }

    #[test]
    fn test_kvl_rows() {
        assert_eq!(
            Component::battery(12.0).kvl_row(),
            Some(KvlRow::Branch {
                resistance: 0.0,
                emf: 12.0
            })
        );
        assert_eq!(
            Component::capacitor(1e-4, 3.0).kvl_row(),
            Some(KvlRow::Branch {
                resistance: 0.0,
                emf: -3.0
            })
        );
        assert_eq!(Component::switch(false).kvl_row(), Some(KvlRow::Open));
        assert_eq!(Component::multimeter(MeterMode::Voltmeter).kvl_row(), Some(KvlRow::Open));
        assert_eq!(Component::junction(3).kvl_row(), None);
    }

    #[test]
    fn test_slots_and_classification() {
        let mut j = Component::junction(3);
        assert!(j.is_junction());
        assert!(!j.is_two_terminal());
        assert_eq!(j.connection(0), None);
        j.attach(ComponentId(1), OUTPUT_SLOT);
        j.attach(ComponentId(2), INPUT_SLOT);
        j.attach(ComponentId(3), INPUT_SLOT);
        j.attach(ComponentId(4), INPUT_SLOT);
        assert!(j.is_fully_connected());
        assert_eq!(j.connection_count(), 4);
        assert_eq!(
            j.connections().collect::<Vec<_>>(),
            vec![ComponentId(2), ComponentId(1), ComponentId(3), ComponentId(4)]
        );
        j.mark_ground();
        assert!(j.is_ground());

        let mut w = Component::wire();
        assert!(!w.is_two_terminal());
        w.absorb_wire();
        assert!(w.is_junction());
        assert_eq!(w.slots(), 2);

        assert!(Component::capacitor(1e-4, 0.0).is_emf_source());
        assert!(!Component::switch(false).conducts());
        assert!(Component::switch(true).conducts());
    }

    #[test]
    fn test_settle_and_advance() {
        let mut r = Component::resistor(5.0);
        r.curr = 2.4;
        r.settle();
        r.advance(1.0);
        assert!((r.emf - 12.0).abs() < 1e-12);

        let mut c = Component::capacitor(1e-3, 0.0);
        c.curr = 2.0;
        c.settle();
        assert_eq!(c.emf, 0.0);
        c.advance(1e-3);
        assert!((c.emf - 2.0).abs() < 1e-12);
    }
}
