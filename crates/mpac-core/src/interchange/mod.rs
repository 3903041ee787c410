//! Catalog interchange files.
//!
//! Catalogs are exchanged as CSV with one row per format:
//! `id_high,id_low,name,length,format`. Export writes a header row and ids
//! as `0xHH`; import skips a leading header row, accepts `0x`-prefixed hex
//! or decimal ids and ignores `#` comment lines. Surrounding whitespace is
//! trimmed from the id and length columns only; names and decode specs are
//! kept verbatim.
//!
//! `CsvFileProvider` exposes a CSV file as a company format provider, the
//! file-backed replacement for database provisioning.

pub mod error;

pub use error::InterchangeError;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::MessageFormat;
use crate::registry::{FormatProvider, ProvisionError};

pub const COLUMNS: [&str; 5] = ["id_high", "id_low", "name", "length", "format"];

/// Read formats from CSV.
///
/// # Examples
/// ```
/// use mpac_core::interchange::read_formats;
///
/// let csv = "id_high,id_low,name,length,format\n0x01,0x02,Speed,2,g * 2 h\n";
/// let formats = read_formats(csv.as_bytes())?;
/// assert_eq!(formats[0].name, "Speed");
/// assert_eq!(formats[0].length, 2);
/// # Ok::<(), mpac_core::InterchangeError>(())
/// ```
///
/// # Errors
/// Returns `InterchangeError::InvalidRecord` for rows with a wrong field
/// count or unparsable ids/lengths, and `Csv`/`Io` for malformed input.
pub fn read_formats<R: Read>(reader: R) -> Result<Vec<MessageFormat>, InterchangeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut formats = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        if row == 0 && is_header(&record) {
            continue;
        }
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(row as u64 + 1);
        formats.push(parse_record(&record, line)?);
    }
    Ok(formats)
}

pub fn read_formats_from_path(path: &Path) -> Result<Vec<MessageFormat>, InterchangeError> {
    let file = File::open(path)?;
    let formats = read_formats(BufReader::new(file))?;
    debug!("read {} formats from {}", formats.len(), path.display());
    Ok(formats)
}

/// Write formats as CSV, header row first.
pub fn write_formats<W: Write>(writer: W, formats: &[MessageFormat]) -> Result<(), InterchangeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for format in formats {
        csv_writer.write_record([
            format!("0x{:02X}", format.id_high),
            format!("0x{:02X}", format.id_low),
            format.name.clone(),
            format.length.to_string(),
            format.format.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_formats_to_path(path: &Path, formats: &[MessageFormat]) -> Result<(), InterchangeError> {
    let file = File::create(path)?;
    write_formats(BufWriter::new(file), formats)?;
    debug!("wrote {} formats to {}", formats.len(), path.display());
    Ok(())
}

fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|field| field.trim().eq_ignore_ascii_case(COLUMNS[0]))
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<MessageFormat, InterchangeError> {
    if record.len() != COLUMNS.len() && record.len() != COLUMNS.len() - 1 {
        return Err(InterchangeError::InvalidRecord {
            line,
            message: format!("expected {} fields, got {}", COLUMNS.len(), record.len()),
        });
    }
    let field = |index: usize| record.get(index).unwrap_or("");
    let key = |index: usize| field(index).trim();

    let id_high = parse_id(key(0)).ok_or_else(|| invalid_field(line, COLUMNS[0], key(0)))?;
    let id_low = parse_id(key(1)).ok_or_else(|| invalid_field(line, COLUMNS[1], key(1)))?;
    let length = key(3)
        .parse::<usize>()
        .map_err(|_| invalid_field(line, COLUMNS[3], key(3)))?;

    Ok(MessageFormat::new(id_high, id_low, field(2), length, field(4)))
}

fn parse_id(value: &str) -> Option<u8> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse::<u8>().ok(),
    }
}

fn invalid_field(line: u64, column: &str, value: &str) -> InterchangeError {
    InterchangeError::InvalidRecord {
        line,
        message: format!("invalid {column} '{value}'"),
    }
}

/// Company provider backed by a CSV catalog file.
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FormatProvider for CsvFileProvider {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<MessageFormat>, ProvisionError> {
        read_formats_from_path(&self.path).map_err(|err| ProvisionError::Provider {
            provider: self.name(),
            message: err.to_string(),
        })
    }
}
