pub mod config;
pub mod error;
pub mod model;
pub mod projector;
pub mod rates;
pub mod schema;
pub mod summary;
pub mod table;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::ProjectorConfig;
pub use error::{InputIssue, ProjectorError};
pub use model::{Period, Phase, ProjectedPeriod, Split};
pub use projector::{BreachProjector, TrajectoryTargets};
pub use rates::Rounding;
pub use summary::{summarize, Summary};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input
    let input = PyModule::new(m.py(), "input")?;
    input.add("PERIOD", schema::input::PERIOD)?;
    input.add("DATE", schema::input::DATE)?;
    input.add("TYPE1_ATTENDANCES", schema::input::TYPE1_ATTENDANCES)?;
    input.add("TYPE3_ATTENDANCES", schema::input::TYPE3_ATTENDANCES)?;
    input.add(
        "TYPE3_COMPLIANCE_PERCENT",
        schema::input::TYPE3_COMPLIANCE_PERCENT,
    )?;
    input.add("TYPE1_BREACHES", schema::input::TYPE1_BREACHES)?;
    input.add("TYPE3_BREACHES", schema::input::TYPE3_BREACHES)?;
    m.add_submodule(&input)?;

    // Output
    let output = PyModule::new(m.py(), "output")?;
    for name in schema::output::ALL {
        output.add(name.to_uppercase(), name)?;
    }
    output.add("ALL", schema::output::ALL.to_vec())?;
    m.add_submodule(&output)?;

    // Phase
    let phase = PyModule::new(m.py(), "phase")?;
    phase.add("PLANNED", schema::phase::PLANNED)?;
    phase.add("HISTORIC", schema::phase::HISTORIC)?;
    phase.add("PROJECTED", schema::phase::PROJECTED)?;
    m.add_submodule(&phase)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyBreachProjector>()?;
    m.add_class::<python::Projection>()?;
    add_schema_exports(m)?;
    Ok(())
}
