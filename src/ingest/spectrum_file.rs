use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::SpectrumRow;

/// Errors that can occur while reading a spectrum file
#[derive(Debug, thiserror::Error)]
pub enum SpectrumFileError {
    /// I/O error reading the file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Extension not recognised
    #[error("Unsupported spectrum file type: {0}")]
    UnsupportedFormat(String),

    /// Header row lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// A value could not be parsed
    #[error("Line {line}: {message}")]
    InvalidValue {
        /// 1-based line number
        line: u64,
        /// What was wrong
        message: String,
    },
}

/// Layout of a spectrum file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumFormat {
    /// Comma-separated with a header row
    Csv,
    /// Tab-separated with a header row
    Tsv,
    /// Whitespace-separated numeric columns
    Columns,
}

impl SpectrumFormat {
    /// Detect the layout from a file extension
    pub fn from_path(path: &Path) -> Result<Self, SpectrumFileError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(SpectrumFormat::Csv),
            "tsv" => Ok(SpectrumFormat::Tsv),
            "txt" | "dat" => Ok(SpectrumFormat::Columns),
            _ => Err(SpectrumFileError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

const ENERGY_COLUMNS: &[&str] = &["energy", "energy_ev", "energy (ev)", "e"];
const ABSORPTION_COLUMNS: &[&str] = &["absorption", "abs", "mu", "intensity"];

/// Read spectrum rows from a file, choosing the parser by extension
pub fn read_spectrum_file<P: AsRef<Path>>(path: P) -> Result<Vec<SpectrumRow>, SpectrumFileError> {
    let path = path.as_ref();
    let format = SpectrumFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        SpectrumFormat::Csv => parse_delimited(reader, b','),
        SpectrumFormat::Tsv => parse_delimited(reader, b'\t'),
        SpectrumFormat::Columns => parse_columns(reader),
    }
}

/// Parse a delimited file whose header names the columns
pub fn parse_delimited<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<SpectrumRow>, SpectrumFileError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let energy = find(ENERGY_COLUMNS).ok_or(SpectrumFileError::MissingColumn("energy"))?;
    let absorption =
        find(ABSORPTION_COLUMNS).ok_or(SpectrumFileError::MissingColumn("absorption"))?;
    let theta = find(&["theta"]);
    let phi = find(&["phi"]);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| record.get(idx).filter(|v| !v.is_empty());

        let required = |idx: usize, name: &str| -> Result<f64, SpectrumFileError> {
            let value = field(idx).ok_or_else(|| SpectrumFileError::InvalidValue {
                line,
                message: format!("missing {name}"),
            })?;
            parse_number(value, line, name)
        };
        let optional = |idx: Option<usize>, name: &str| -> Result<Option<f64>, SpectrumFileError> {
            idx.and_then(field)
                .map(|value| parse_number(value, line, name))
                .transpose()
        };

        rows.push(SpectrumRow {
            energy: required(energy, "energy")?,
            absorption: required(absorption, "absorption")?,
            theta: optional(theta, "theta")?,
            phi: optional(phi, "phi")?,
        });
    }
    Ok(rows)
}

/// Parse whitespace-separated columns: energy, absorption, and optionally theta and phi.
///
/// Blank lines and `#` comments are skipped, as are non-numeric lines before
/// the first data row.
pub fn parse_columns<R: BufRead>(reader: R) -> Result<Vec<SpectrumRow>, SpectrumFileError> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx as u64 + 1;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if rows.is_empty() && tokens[0].parse::<f64>().is_err() {
            // header line
            continue;
        }

        let values = tokens
            .iter()
            .map(|t| parse_number(t, line_no, "value"))
            .collect::<Result<Vec<f64>, _>>()?;
        let row = match values.as_slice() {
            [energy, absorption] => SpectrumRow::new(*energy, *absorption),
            [energy, absorption, theta, phi, ..] => {
                SpectrumRow::with_geometry(*energy, *absorption, *theta, *phi)
            }
            _ => {
                return Err(SpectrumFileError::InvalidValue {
                    line: line_no,
                    message: format!("expected 2 or 4 columns, found {}", values.len()),
                })
            }
        };
        rows.push(row);
    }
    Ok(rows)
}

fn parse_number(value: &str, line: u64, name: &str) -> Result<f64, SpectrumFileError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SpectrumFileError::InvalidValue {
            line,
            message: format!("invalid {name}: {value:?}"),
        })
}
