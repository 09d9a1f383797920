//! Results output formatting (CSV).

use std::io::Write;

use crate::circuit::Circuit;
use crate::components::{BulbState, ComponentKind};
use crate::error::Result;
use crate::solver::SimulationResult;

/// Write the most recent solved values of every component as CSV.
///
/// Format:
/// ```csv
/// Component,Voltage,Current,Reading
/// B0,12,2.4,
/// R1,12,2.4,
/// AM4,0,2.4,2.4
/// L5,12,2.4,ON
/// ```
pub fn write_operating_point<W: Write>(circuit: &Circuit, writer: &mut W) -> Result<()> {
    writeln!(writer, "Component,Voltage,Current,Reading")?;
    for component in &circuit.vertices {
        write!(
            writer,
            "{},{},{},",
            component.name, component.emf, component.curr
        )?;
        match &component.kind {
            ComponentKind::Multimeter(meter) => write!(writer, "{}", meter.reading)?,
            ComponentKind::LightBulb(bulb) => {
                write!(writer, "{}", if bulb.state == BulbState::On { "ON" } else { "OFF" })?
            }
            _ => {}
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write per-component time series as CSV.
///
/// One row per sample of `result`, read from the tail of each component's
/// history (so a simulator that was run more than once still lines up with
/// the time axis of its last run).
///
/// Format:
/// ```csv
/// time,C0_V,C0_I,C0_Q,R1_V,R1_I,...
/// 0,0,0.012,0,12,0.012,...
/// 0.001,0.12,0.01188,0.000012,11.88,0.01188,...
/// ```
pub fn write_csv<W: Write>(
    circuit: &Circuit,
    result: &SimulationResult,
    writer: &mut W,
) -> Result<()> {
    // Header row
    write!(writer, "time")?;
    for component in &circuit.vertices {
        write!(writer, ",{0}_V,{0}_I", component.name)?;
        if component.is_capacitor() {
            write!(writer, ",{}_Q", component.name)?;
        }
    }
    writeln!(writer)?;

    // Data rows
    for (row, t) in result.time.iter().enumerate() {
        write!(writer, "{}", t)?;
        for component in &circuit.vertices {
            let history = &component.history;
            let idx = (history.len() + row).checked_sub(result.len());
            let sample = |series: &[f64]| idx.and_then(|i| series.get(i).copied());

            write_cell(writer, sample(history.voltage.as_slice()))?;
            write_cell(writer, sample(history.current.as_slice()))?;
            if component.is_capacitor() {
                write_cell(writer, sample(history.charge.as_slice()))?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_cell<W: Write>(writer: &mut W, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) => write!(writer, ",{}", v)?,
        None => write!(writer, ",")?,
    }
    Ok(())
}
