//! Main simulator interface.

use tracing::{debug, info, info_span};

use crate::circuit::{check_parameters, check_topology, validate_circuit, Circuit};
use crate::error::{Result, VoltaicError};

use super::mna::{assemble, MnaMatrix, RowMap};
use super::{DEFAULT_DT, DEFAULT_NUM_STEPS};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Time step in seconds.
    pub dt: f64,
    /// Number of steps to run when the circuit contains a capacitor.
    pub num_steps: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            num_steps: DEFAULT_NUM_STEPS,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time step (in seconds).
    ///
    /// Explicit Euler integration of capacitor charge is only accurate while
    /// `dt` is small against the circuit's RC time constant; a tenth of it
    /// or less is a reasonable starting point.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the number of time steps.
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps;
        self
    }

    /// Check that the time axis is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(VoltaicError::simulation_param(format!(
                "dt must be a positive number of seconds, got {}",
                self.dt
            )));
        }
        if self.num_steps == 0 {
            return Err(VoltaicError::simulation_param(
                "num_steps must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Outcome of a run: the time axis shared by every component history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResult {
    /// Simulated time of each recorded sample, in seconds.
    pub time: Vec<f64>,
}

impl SimulationResult {
    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// The main circuit simulator.
///
/// Owns a normalized, validated circuit together with its row mapping and
/// matrix; every step reuses the same matrix storage.
#[derive(Debug)]
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    /// Component <-> matrix row mapping
    rows: RowMap,
    /// Linear system reused across steps
    matrix: MnaMatrix,
    config: SimulatorConfig,
    /// Steps solved so far
    steps: usize,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Result<Self> {
        Self::with_config(circuit, SimulatorConfig::default())
    }

    /// Create a new simulator for the given circuit with custom configuration.
    ///
    /// Normalizes the circuit, then runs every boundary check before any
    /// solve: topology, component parameters, the time axis (only when a
    /// capacitor is present) and finally loop validation, which fails with
    /// [`VoltaicError::CircuitInvalid`].
    pub fn with_config(mut circuit: Circuit, config: SimulatorConfig) -> Result<Self> {
        circuit.normalize()?;
        check_topology(&circuit)?;
        check_parameters(&circuit)?;
        if circuit.has_capacitors() {
            config.validate()?;
        }
        if !validate_circuit(&circuit)? {
            return Err(VoltaicError::CircuitInvalid);
        }

        let rows = RowMap::new(&circuit)?;
        let matrix = MnaMatrix::new(rows.size());
        debug!(
            components = circuit.len(),
            wires = circuit.edges.len(),
            unknowns = rows.size(),
            "simulator ready"
        );

        circuit.clear_history();
        Ok(Self {
            circuit,
            rows,
            matrix,
            config,
            steps: 0,
        })
    }

    /// Solve one step: assemble, solve, scatter the solution, settle derived
    /// values, refresh displays, record history, then integrate capacitors
    /// forward to the next step.
    pub fn run_step(&mut self) -> Result<()> {
        assemble(&self.circuit, &self.rows, &mut self.matrix);
        self.solve().map_err(|err| self.describe(err))?;
        self.scatter()?;

        for component in &mut self.circuit.vertices {
            component.settle();
        }
        self.update_junctions();
        self.update_displays();

        let dt = self.config.dt;
        for component in &mut self.circuit.vertices {
            component.record();
            component.advance(dt);
        }

        self.steps += 1;
        Ok(())
    }

    /// Run the whole simulation.
    ///
    /// A circuit without capacitors is solved exactly once; otherwise
    /// `num_steps` steps are run at a fixed `dt`. Returns the time axis of
    /// the samples appended by this call.
    pub fn run(&mut self) -> Result<SimulationResult> {
        let steps = if self.circuit.has_capacitors() {
            self.config.num_steps
        } else {
            1
        };

        let _span = info_span!("simulate", components = self.circuit.len(), steps).entered();

        let mut time = Vec::with_capacity(steps);
        for _ in 0..steps {
            time.push(self.time());
            self.run_step()?;
        }

        info!(steps, end = self.time(), "simulation finished");
        Ok(SimulationResult { time })
    }

    /// Simulated time of the next step to be solved.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.config.dt
    }

    /// Number of steps solved so far.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Get a reference to the (normalized) circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume the simulator and hand back the circuit with its histories.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    fn solve(&mut self) -> Result<()> {
        self.matrix.factor()?;
        self.matrix.solve()
    }

    /// Attach the owning component's label to a singular-matrix error.
    fn describe(&self, err: VoltaicError) -> VoltaicError {
        match err {
            VoltaicError::SingularMatrix { size, row, .. } if row < self.rows.size() => {
                let id = self.rows.component(row);
                VoltaicError::SingularMatrix {
                    size,
                    row,
                    component: self.circuit.component(id).name.clone(),
                }
            }
            other => other,
        }
    }

    /// Write the solution back: potentials to junctions, currents to elements.
    fn scatter(&mut self) -> Result<()> {
        let ground = self.rows.ground();
        self.circuit.component_mut(ground).emf = 0.0;

        for (row, id) in self.rows.iter() {
            let value = self.matrix.x[row];
            let component = self.circuit.component_mut(id);
            if !value.is_finite() {
                return Err(VoltaicError::NumericalOverflow {
                    component: component.name.clone(),
                    value,
                });
            }
            if component.is_junction() {
                component.emf = value;
            } else {
                component.curr = value;
            }
        }
        Ok(())
    }

    fn update_junctions(&mut self) {
        let inflows: Vec<Option<f64>> = self
            .circuit
            .ids()
            .map(|id| {
                self.circuit
                    .component(id)
                    .is_junction()
                    .then(|| self.circuit.junction_inflow(id))
            })
            .collect();

        for (component, inflow) in self.circuit.vertices.iter_mut().zip(inflows) {
            if let Some(inflow) = inflow {
                component.curr = inflow;
            }
        }
    }

    /// Meters and bulbs read settled values, so this runs last.
    fn update_displays(&mut self) {
        let across: Vec<f64> = self
            .circuit
            .ids()
            .map(|id| self.circuit.potential_across(id))
            .collect();

        for (component, across) in self.circuit.vertices.iter_mut().zip(across) {
            if component.is_two_terminal() {
                component.update_display(across);
            }
        }
    }
}

/// Build a simulator with `config`, run it and return the simulated circuit
/// alongside its time axis.
pub fn simulate(circuit: Circuit, config: SimulatorConfig) -> Result<(Circuit, SimulationResult)> {
    let mut simulator = Simulator::with_config(circuit, config)?;
    let result = simulator.run()?;
    Ok((simulator.into_circuit(), result))
}
