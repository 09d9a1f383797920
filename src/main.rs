//! Voltaic - DC/RC Circuit Simulator
//!
//! Reads a JSON circuit description, validates it and prints the solved
//! operating point (or, with capacitors present, the full time series) as CSV.
//!
//! # Usage
//!
//! ```bash
//! voltaic circuit.json --dt 1e-3 --steps 1000 --output results.csv
//! RUST_LOG=debug voltaic circuit.json --normalized normalized.json
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voltaic_core::{
    circuit::{check_parameters, check_topology, validate_circuit},
    error::{Result, VoltaicError},
    netlist::CircuitDescription,
    output, Simulator, SimulatorConfig,
};

/// DC/RC circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file (.json)
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Time step in seconds (circuits with capacitors only)
    #[arg(long, default_value_t = voltaic_core::solver::DEFAULT_DT)]
    dt: f64,

    /// Number of time steps (circuits with capacitors only)
    #[arg(long, default_value_t = voltaic_core::solver::DEFAULT_NUM_STEPS)]
    steps: usize,

    /// Write CSV results to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the normalized circuit as JSON to this file
    #[arg(long, value_name = "FILE")]
    normalized: Option<PathBuf>,

    /// Only validate the circuit, do not simulate
    #[arg(long)]
    validate_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let description = CircuitDescription::load(&args.circuit_file)?;
    let mut circuit = description.to_circuit();
    circuit.normalize()?;

    if let Some(path) = &args.normalized {
        CircuitDescription::from_circuit(&circuit).save(path)?;
        info!(path = %path.display(), "wrote normalized circuit");
    }

    if args.validate_only {
        check_topology(&circuit)?;
        check_parameters(&circuit)?;
        return if validate_circuit(&circuit)? {
            println!("valid");
            Ok(())
        } else {
            Err(VoltaicError::CircuitInvalid)
        };
    }

    let config = SimulatorConfig::new()
        .with_dt(args.dt)
        .with_num_steps(args.steps);
    let mut simulator = Simulator::with_config(circuit, config)?;
    let result = simulator.run()?;
    let circuit = simulator.circuit();

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| VoltaicError::FileWriteError {
                path: path.display().to_string(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            write_results(&mut writer, circuit, &result)?;
            writer.flush()?;
            info!(path = %path.display(), "wrote results");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_results(&mut writer, circuit, &result)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn write_results<W: Write>(
    writer: &mut W,
    circuit: &voltaic_core::Circuit,
    result: &voltaic_core::solver::SimulationResult,
) -> Result<()> {
    if circuit.has_capacitors() {
        output::write_csv(circuit, result, writer)
    } else {
        output::write_operating_point(circuit, writer)
    }
}
