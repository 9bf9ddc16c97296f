//! Serialisation of certificate records.
//!
//! Three formats are supported: a JSON array (the default), CSV with every
//! field quoted, and a human readable table.

use crate::record::CertificateRecord;
use comfy_table::Table;
use std::fmt;
use std::io::{self, Write};
use strum_macros::{Display, EnumString};

/// Output format of the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

/// Errors raised while writing records.
#[derive(Debug)]
pub enum OutputError {
    Io(io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO Error: {}", e),
            OutputError::Json(e) => write!(f, "JSON Error: {}", e),
            OutputError::Csv(e) => write!(f, "CSV Error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Json(e) => Some(e),
            OutputError::Csv(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Json(e)
    }
}

impl From<csv::Error> for OutputError {
    fn from(e: csv::Error) -> Self {
        OutputError::Csv(e)
    }
}

/// Writes `records` to `out` in the given format.
pub fn write_records<W: Write>(
    out: W,
    records: &[CertificateRecord],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => write_json(out, records),
        OutputFormat::Csv => write_csv(out, records),
        OutputFormat::Text => write_text(out, records),
    }
}

/// JSON array of objects keyed `host`, `notBefore`, `notAfter`, `serial`,
/// `issuer` (and `error` on failed hosts).
pub fn write_json<W: Write>(mut out: W, records: &[CertificateRecord]) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut out, records)?;
    writeln!(out)?;
    Ok(())
}

/// One quoted row per record: host, notBefore, notAfter, serial, issuer,
/// error. No header row.
pub fn write_csv<W: Write>(out: W, records: &[CertificateRecord]) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(out);
    for record in records {
        writer.write_record([
            record.host.as_str(),
            record.not_before.as_str(),
            record.not_after.as_str(),
            record.serial.as_str(),
            record.issuer.as_str(),
            record.error.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_text<W: Write>(mut out: W, records: &[CertificateRecord]) -> Result<(), OutputError> {
    let mut table = Table::new();
    table.set_header(vec!["Host", "Not Before", "Not After", "Serial", "Issuer / Error"]);
    for record in records {
        let last = match &record.error {
            Some(error) => format!("ERROR: {}", error),
            None => record.issuer.clone(),
        };
        table.add_row(vec![
            record.host.clone(),
            record.not_before.clone(),
            record.not_after.clone(),
            record.serial.clone(),
            last,
        ]);
    }
    writeln!(out, "{}", table)?;
    Ok(())
}
