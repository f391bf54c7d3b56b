use chrono::NaiveDate;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3_polars::PyDataFrame;

use crate::config::ProjectorConfig;
use crate::model::{self, ProjectedPeriod, Split};
use crate::projector::{BreachProjector, TrajectoryTargets};
use crate::summary::summarize;
use crate::table;

#[pyclass(name = "BreachProjector")]
pub struct PyBreachProjector {
    inner: BreachProjector,
}

#[pymethods]
impl PyBreachProjector {
    /// Create a projector, optionally from a TOML config file.
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => ProjectorConfig::from_file(path)?,
            None => ProjectorConfig::default(),
        };
        Ok(Self {
            inner: BreachProjector::new(config)?,
        })
    }

    /// Create a projector from a TOML config string.
    #[staticmethod]
    fn from_toml(content: &str) -> PyResult<Self> {
        let config = ProjectorConfig::from_toml_str(content)?;
        Ok(Self {
            inner: BreachProjector::new(config)?,
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load a period CSV and return it with canonical column names.
    ///
    /// Legacy calculator headers ("Type 1 Attendances", ...) are accepted.
    /// Every row is parsed up front; bad cells raise ValueError.
    fn load_periods(&self, filename: &str) -> PyResult<PyDataFrame> {
        let config = self.inner.config();
        let periods = table::read_periods_csv(filename, config)?;
        Ok(PyDataFrame(table::periods_input_frame(&periods)?))
    }

    /// Empty planning table of calendar months starting at `start`.
    #[staticmethod]
    #[pyo3(signature = (start, months=12))]
    fn planning_table(start: NaiveDate, months: usize) -> PyResult<PyDataFrame> {
        let periods = model::planning_months(start, months);
        Ok(PyDataFrame(table::periods_input_frame(&periods)?))
    }

    // ── Projection ──────────────────────────────────────────────────────────

    /// Type 1 breaches that meet an overall target, per period.
    fn compute_required_breaches(
        &self,
        periods: PyDataFrame,
        overall_target_percent: f64,
    ) -> PyResult<Projection> {
        let config = self.inner.config();
        let periods = table::periods_from_frame(periods.0, config)?;
        let rows = self
            .inner
            .compute_required_breaches(&periods, overall_target_percent)?;
        Ok(Projection::new(rows, &self.inner))
    }

    /// Linear Type 1 trajectory from `start_type1_target_percent` to
    /// `end_type1_target_percent` over the projected periods.
    ///
    /// Args:
    ///     split_date: periods dated before this are historic
    ///     split_index: the first `split_index` periods are historic
    #[pyo3(signature = (
        periods,
        type3_target_percent,
        start_type1_target_percent,
        end_type1_target_percent,
        split_date=None,
        split_index=None,
    ))]
    fn compute_trajectory(
        &self,
        periods: PyDataFrame,
        type3_target_percent: f64,
        start_type1_target_percent: f64,
        end_type1_target_percent: f64,
        split_date: Option<NaiveDate>,
        split_index: Option<usize>,
    ) -> PyResult<Projection> {
        let split = match (split_date, split_index) {
            (Some(_), Some(_)) => {
                return Err(PyValueError::new_err(
                    "Pass either split_date or split_index, not both",
                ))
            }
            (Some(date), None) => Some(Split::Date(date)),
            (None, Some(index)) => Some(Split::Index(index)),
            (None, None) => None,
        };

        let config = self.inner.config();
        let periods = table::periods_from_frame(periods.0, config)?;
        let targets = TrajectoryTargets {
            type3_target_percent,
            start_type1_target_percent,
            end_type1_target_percent,
        };
        let rows = self.inner.compute_trajectory(&periods, targets, split)?;
        Ok(Projection::new(rows, &self.inner))
    }
}

/// Augmented table returned by a projection. Immutable: adjustments
/// return a new `Projection`.
#[pyclass]
pub struct Projection {
    rows: Vec<ProjectedPeriod>,
    projector: BreachProjector,
}

impl Projection {
    fn new(rows: Vec<ProjectedPeriod>, projector: &BreachProjector) -> Self {
        Self {
            rows,
            projector: projector.clone(),
        }
    }
}

#[pymethods]
impl Projection {
    /// Subtract a uniform weekly reduction from every period's Type 1 breaches.
    fn apply_manual_adjustment(&self, weekly_reduction: f64) -> PyResult<Projection> {
        let rows = self
            .projector
            .apply_manual_adjustment(&self.rows, weekly_reduction)?;
        Ok(Projection::new(rows, &self.projector))
    }

    fn to_frame(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(table::periods_to_frame(&self.rows)?))
    }

    /// Delimited text, for the download button.
    fn to_csv(&self) -> PyResult<String> {
        Ok(table::to_csv_string(&self.rows, self.projector.config())?)
    }

    fn write_csv(&self, filename: &str) -> PyResult<()> {
        Ok(table::write_csv_file(
            &self.rows,
            filename,
            self.projector.config(),
        )?)
    }

    fn summary<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let summary = summarize(&self.rows);
        let dict = PyDict::new(py);
        dict.set_item("periods", summary.periods)?;
        dict.set_item("total_type1_breaches", summary.total_type1_breaches)?;
        dict.set_item(
            "total_adjusted_type1_breaches",
            summary.total_adjusted_type1_breaches,
        )?;
        dict.set_item("total_type3_breaches", summary.total_type3_breaches)?;
        dict.set_item("total_attendances", summary.total_attendances)?;
        dict.set_item("type1_breach_percent", summary.type1_breach_percent)?;
        dict.set_item(
            "overall_performance_percent",
            summary.overall_performance_percent,
        )?;
        Ok(dict)
    }

    fn __len__(&self) -> usize {
        self.rows.len()
    }
}
