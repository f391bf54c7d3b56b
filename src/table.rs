//! Tabular boundary: period tables in, augmented tables out.
//!
//! Uploaded tables are read with every column as a string, normalised onto
//! the canonical column names, and parsed row by row so that every bad cell
//! is reported together.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::config::ProjectorConfig;
use crate::error::{InputIssue, ProjectorError};
use crate::model::{Period, ProjectedPeriod};
use crate::schema::{input, legacy, output};

const PARSED_SUFFIX: &str = "__parsed";

/// Format of the exported `date` column, always accepted when read back.
const ISO_DATE: &str = "%Y-%m-%d";

const WHITESPACE: &str = " \t\r\n";

const NUMERIC_COLUMNS: [&str; 5] = [
    input::TYPE1_ATTENDANCES,
    input::TYPE3_ATTENDANCES,
    input::TYPE3_COMPLIANCE_PERCENT,
    input::TYPE1_BREACHES,
    input::TYPE3_BREACHES,
];

// ── Reading ─────────────────────────────────────────────────────────────────

/// Load a period table from a delimited text file.
pub fn read_periods_csv<P: AsRef<Path>>(
    path: P,
    config: &ProjectorConfig,
) -> Result<Vec<Period>, ProjectorError> {
    config.validate()?;
    let path = path.as_ref();
    let df = read_csv_as_strings(path, config.separator_byte()?)?;
    let periods = periods_from_frame(df, config)?;
    log::info!("Loaded {} periods from {}", periods.len(), path.display());
    Ok(periods)
}

/// Read a CSV file with all columns as String dtype.
pub fn read_csv_as_strings(path: &Path, separator: u8) -> Result<DataFrame, ProjectorError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Trim column names and rename legacy headers onto the canonical columns.
/// A legacy header is ignored when its canonical column is already present.
pub fn normalize_columns(mut df: DataFrame) -> Result<DataFrame, ProjectorError> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    let mut present = trimmed;
    let mut old = Vec::new();
    let mut new = Vec::new();
    for (legacy_name, canonical) in legacy::ALIASES {
        let has_legacy = present.iter().any(|c| c == legacy_name);
        let has_canonical = present.iter().any(|c| c == canonical);
        if has_legacy && !has_canonical {
            old.push(legacy_name);
            new.push(canonical);
            present.push(canonical.to_string());
        }
    }

    if old.is_empty() {
        return Ok(df);
    }
    log::debug!("Renaming legacy columns {:?} -> {:?}", old, new);
    Ok(df.lazy().rename(old, new, true).collect()?)
}

/// Convert a DataFrame (from a file or from the shell) into periods.
///
/// Required columns: period, type1_attendances, type3_attendances.
/// Optional: date, type3_compliance_percent, type1_breaches, type3_breaches.
/// Blank optional cells read as absent; blank required cells, unparsable
/// numbers and unparsable dates are reported as `InvalidInput`. A period
/// without a `date` cell is dated from its label when the label parses.
pub fn periods_from_frame(
    df: DataFrame,
    config: &ProjectorConfig,
) -> Result<Vec<Period>, ProjectorError> {
    config.validate()?;
    let df = normalize_columns(df)?;
    require_columns(&df, &input::REQUIRED)?;

    let present: Vec<&str> = NUMERIC_COLUMNS
        .iter()
        .copied()
        .filter(|c| df.schema().contains(c))
        .collect();
    let has_dates = df.schema().contains(input::DATE);

    let mut exprs: Vec<Expr> = Vec::with_capacity(present.len() * 2 + 2);
    exprs.push(trimmed_string(input::PERIOD));
    if has_dates {
        exprs.push(trimmed_string(input::DATE));
    }
    for &name in &present {
        let raw = trimmed_string(name);
        exprs.push(
            raw.clone()
                .cast(DataType::Float64)
                .alias(format!("{name}{PARSED_SUFFIX}")),
        );
        exprs.push(raw);
    }
    let df = df.lazy().with_columns(exprs).collect()?;

    let labels = df.column(input::PERIOD)?.str()?;
    let dates = if has_dates {
        Some(df.column(input::DATE)?.str()?)
    } else {
        None
    };
    let mut cells = Vec::with_capacity(present.len());
    for &name in &present {
        let raw = df.column(name)?.str()?;
        let parsed = df.column(&format!("{name}{PARSED_SUFFIX}"))?.f64()?;
        cells.push(NumericColumn { name, raw, parsed });
    }

    let mut issues = Vec::new();
    let mut periods = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let label = labels.get(i).unwrap_or("").to_string();
        if label.is_empty() {
            issues.push(InputIssue::row(i, "", input::PERIOD, "missing"));
        }

        let mut value = |name: &str, required: bool| -> Option<f64> {
            let column = cells.iter().find(|c| c.name == name)?;
            match column.cell(i) {
                Cell::Value(v) => Some(v),
                Cell::Blank => {
                    if required {
                        issues.push(InputIssue::row(i, &label, name, "missing"));
                    }
                    None
                }
                Cell::Unparsable(text) => {
                    issues.push(InputIssue::row(
                        i,
                        &label,
                        name,
                        format!("'{text}' is not a number"),
                    ));
                    None
                }
            }
        };

        let type1_attendances = value(input::TYPE1_ATTENDANCES, true);
        let type3_attendances = value(input::TYPE3_ATTENDANCES, true);
        let type3_compliance_percent = value(input::TYPE3_COMPLIANCE_PERCENT, false);
        let type1_breaches = value(input::TYPE1_BREACHES, false);
        let type3_breaches = value(input::TYPE3_BREACHES, false);

        let formats = &config.table.date_formats;
        let date = match dates.and_then(|d| d.get(i)).filter(|text| !text.is_empty()) {
            Some(text) => {
                let date = parse_date(text, formats)
                    .or_else(|| NaiveDate::parse_from_str(text, ISO_DATE).ok());
                if date.is_none() {
                    issues.push(InputIssue::row(
                        i,
                        &label,
                        input::DATE,
                        format!("'{text}' is not a date in any configured format"),
                    ));
                }
                date
            }
            None => parse_date(&label, formats),
        };

        periods.push(Period {
            date,
            label,
            type1_attendances: type1_attendances.unwrap_or(0.0),
            type3_attendances: type3_attendances.unwrap_or(0.0),
            type3_compliance_percent,
            type1_breaches,
            type3_breaches,
        });
    }

    if !issues.is_empty() {
        return Err(ProjectorError::InvalidInput(issues));
    }
    Ok(periods)
}

fn trimmed_string(name: &str) -> Expr {
    col(name)
        .cast(DataType::String)
        .str()
        .strip_chars(lit(WHITESPACE))
}

struct NumericColumn<'a> {
    name: &'a str,
    raw: &'a StringChunked,
    parsed: &'a Float64Chunked,
}

enum Cell<'a> {
    Value(f64),
    Blank,
    Unparsable(&'a str),
}

impl<'a> NumericColumn<'a> {
    fn cell(&self, i: usize) -> Cell<'a> {
        match (self.raw.get(i), self.parsed.get(i)) {
            (_, Some(v)) => Cell::Value(v),
            (None, None) => Cell::Blank,
            (Some(text), None) if text.is_empty() => Cell::Blank,
            (Some(text), None) => Cell::Unparsable(text),
        }
    }
}

/// First of `formats` that parses `label`, as a date or a datetime.
pub fn parse_date(label: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(label, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(label, fmt).ok().map(|dt| dt.date()))
    })
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), ProjectorError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(ProjectorError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

// ── Writing ─────────────────────────────────────────────────────────────────

/// Periods as an input table, the shape `periods_from_frame` reads back.
pub fn periods_input_frame(periods: &[Period]) -> Result<DataFrame, ProjectorError> {
    let labels: Vec<String> = periods.iter().map(|p| p.label.clone()).collect();
    let dates: Vec<Option<String>> = periods
        .iter()
        .map(|p| p.date.map(|d| d.format(ISO_DATE).to_string()))
        .collect();
    let type1: Vec<f64> = periods.iter().map(|p| p.type1_attendances).collect();
    let type3: Vec<f64> = periods.iter().map(|p| p.type3_attendances).collect();
    let compliance: Vec<Option<f64>> = periods
        .iter()
        .map(|p| p.type3_compliance_percent)
        .collect();
    let type1_breaches: Vec<Option<f64>> = periods.iter().map(|p| p.type1_breaches).collect();
    let type3_breaches: Vec<Option<f64>> = periods.iter().map(|p| p.type3_breaches).collect();

    Ok(DataFrame::new(vec![
        Column::new(input::PERIOD.into(), labels),
        Column::new(input::DATE.into(), dates),
        Column::new(input::TYPE1_ATTENDANCES.into(), type1),
        Column::new(input::TYPE3_ATTENDANCES.into(), type3),
        Column::new(input::TYPE3_COMPLIANCE_PERCENT.into(), compliance),
        Column::new(input::TYPE1_BREACHES.into(), type1_breaches),
        Column::new(input::TYPE3_BREACHES.into(), type3_breaches),
    ])?)
}

/// Augmented rows as a DataFrame, columns in `schema::output::ALL` order.
pub fn periods_to_frame(rows: &[ProjectedPeriod]) -> Result<DataFrame, ProjectorError> {
    fn floats(rows: &[ProjectedPeriod], f: impl Fn(&ProjectedPeriod) -> f64) -> Vec<f64> {
        rows.iter().map(f).collect()
    }
    fn optional(
        rows: &[ProjectedPeriod],
        f: impl Fn(&ProjectedPeriod) -> Option<f64>,
    ) -> Vec<Option<f64>> {
        rows.iter().map(f).collect()
    }

    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let dates: Vec<Option<String>> = rows
        .iter()
        .map(|r| r.date.map(|d| d.format(ISO_DATE).to_string()))
        .collect();
    let phases: Vec<&str> = rows.iter().map(|r| r.phase.as_str()).collect();

    let columns = vec![
        Column::new(output::PERIOD.into(), labels),
        Column::new(output::DATE.into(), dates),
        Column::new(output::PHASE.into(), phases),
        Column::new(
            output::TYPE1_ATTENDANCES.into(),
            floats(rows, |r| r.type1_attendances),
        ),
        Column::new(
            output::TYPE3_ATTENDANCES.into(),
            floats(rows, |r| r.type3_attendances),
        ),
        Column::new(
            output::TOTAL_ATTENDANCES.into(),
            floats(rows, |r| r.total_attendances),
        ),
        Column::new(
            output::TYPE1_TARGET_PERCENT.into(),
            optional(rows, |r| r.type1_target_percent),
        ),
        Column::new(
            output::TARGET_BREACHES_ALLOWED.into(),
            optional(rows, |r| r.target_breaches_allowed),
        ),
        Column::new(
            output::TYPE3_BREACHES.into(),
            floats(rows, |r| r.type3_breaches),
        ),
        Column::new(
            output::TYPE1_BREACHES.into(),
            floats(rows, |r| r.type1_breaches),
        ),
        Column::new(
            output::TYPE1_PERFORMANCE_PERCENT.into(),
            optional(rows, |r| r.type1_performance_percent),
        ),
        Column::new(
            output::TYPE3_PERFORMANCE_PERCENT.into(),
            optional(rows, |r| r.type3_performance_percent),
        ),
        Column::new(
            output::OVERALL_PERFORMANCE_PERCENT.into(),
            optional(rows, |r| r.overall_performance_percent),
        ),
        Column::new(
            output::ADJUSTED_TYPE1_BREACHES.into(),
            optional(rows, |r| r.adjusted_type1_breaches),
        ),
    ];

    Ok(DataFrame::new(columns)?)
}

/// Write augmented rows as delimited text. Undefined values are empty cells.
pub fn write_csv<W: Write>(
    rows: &[ProjectedPeriod],
    writer: &mut W,
    config: &ProjectorConfig,
) -> Result<(), ProjectorError> {
    config.validate()?;
    let separator = config.separator_byte()?;
    let mut df = periods_to_frame(rows)?;
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(separator)
        .finish(&mut df)?;
    Ok(())
}

/// Same as [`write_csv`], returned as a string for download.
pub fn to_csv_string(
    rows: &[ProjectedPeriod],
    config: &ProjectorConfig,
) -> Result<String, ProjectorError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf, config)?;
    String::from_utf8(buf)
        .map_err(|e| ProjectorError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn write_csv_file<P: AsRef<Path>>(
    rows: &[ProjectedPeriod],
    path: P,
    config: &ProjectorConfig,
) -> Result<(), ProjectorError> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    write_csv(rows, &mut file, config)?;
    log::info!("Exported {} periods to {}", rows.len(), path.display());
    Ok(())
}
