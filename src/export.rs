use std::str::FromStr;

use rust_xlsxwriter::Workbook;

use crate::error::ExportError;
use crate::record::{Cell, Record};

/// Output format for a finished record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Xlsx,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
        }
    }
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "xlsx" | "excel" => Ok(Format::Xlsx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Serialized payload plus the file extension it should be saved under.
#[derive(Debug)]
pub struct ExportBlob {
    pub payload: Payload,
    pub extension: &'static str,
}

#[derive(Debug)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl ExportBlob {
    pub fn as_bytes(&self) -> &[u8] {
        match &self.payload {
            Payload::Text(s) => s.as_bytes(),
            Payload::Binary(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            Payload::Binary(_) => None,
        }
    }
}

/// Serialize records to the requested format.
///
/// All formats carry the same logical content: JSON keeps native types
/// and nulls, CSV/XLSX flatten sequence fields to delimited strings.
/// Empty input yields `[]` for JSON and a zero-byte payload for CSV.
pub fn export<R: Record>(records: &[R], format: Format) -> Result<ExportBlob, ExportError> {
    let payload = match format {
        Format::Json => Payload::Text(to_json(records)?),
        Format::Csv => Payload::Text(to_csv(records)?),
        Format::Xlsx => Payload::Binary(to_xlsx(records)?),
    };
    Ok(ExportBlob {
        payload,
        extension: format.extension(),
    })
}

fn to_json<R: Record>(records: &[R]) -> Result<String, ExportError> {
    // serde_json writes struct fields in declaration order and leaves
    // non-ASCII text unescaped.
    Ok(serde_json::to_string_pretty(records)?)
}

fn to_csv<R: Record>(records: &[R]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::FIELDS)?;
    for record in records {
        let row: Vec<String> = record.row().iter().map(Cell::to_csv_field).collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    // The writer only ever receives valid UTF-8
    Ok(String::from_utf8(bytes).expect("CSV writer emitted invalid UTF-8"))
}

fn to_xlsx<R: Record>(records: &[R]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, field) in R::FIELDS.iter().enumerate() {
        sheet.write_string(0, col as u16, *field)?;
    }
    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in record.row().iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(row, col, s)?;
                }
                Cell::Float(v) => {
                    sheet.write_number(row, col, *v)?;
                }
                Cell::Int(v) => {
                    sheet.write_number(row, col, *v as f64)?;
                }
                Cell::Bool(v) => {
                    sheet.write_boolean(row, col, *v)?;
                }
                Cell::Null => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
