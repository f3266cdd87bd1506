//! CSV import and export of the fare table.
//!
//! Column order is fixed: destination, region, meter value, counter value.
//! Export quotes the text columns; import accepts both quoted and bare fields,
//! so an exported file imports back unchanged.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::fare::Fare;

pub const HEADER: &str = "Destino,Regiao,ValorTaximetro,ValorBalcao";
pub const TEMPLATE_FILE_NAME: &str = "modelo_importacao.csv";
const BOM: char = '\u{FEFF}';

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CsvImportError {
    #[error("no valid fares found in the file, check the format (Destino,Regiao,ValorTaximetro,ValorBalcao)")]
    NoValidRows,
    #[error("the file could not be processed, make sure it is a CSV in the format Destino,Regiao,ValorTaximetro,ValorBalcao")]
    Unreadable,
}

/// Accepted rows of one import, plus how many data rows were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch {
    pub fares: Vec<Fare>,
    pub rejected: usize,
}

/// A named CSV payload ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub file_name: String,
    pub content: String,
}

pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedBatch, CsvImportError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        warn!("csv upload is not valid UTF-8: {}", e);
        CsvImportError::Unreadable
    })?;
    parse(text)
}

/// Parses an uploaded table. The first non-blank line is a header and is skipped
/// without looking at it.
pub fn parse(text: &str) -> Result<ParsedBatch, CsvImportError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let batch = Uuid::new_v4().simple();

    let mut fares = Vec::new();
    let mut rejected = 0;
    for (index, line) in text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .enumerate()
    {
        match parse_row(line, format!("imported-{batch}-{index}")) {
            Some(fare) => fares.push(fare),
            None => {
                debug!(row = index, "csv row rejected");
                rejected += 1;
            }
        }
    }

    if fares.is_empty() {
        return Err(CsvImportError::NoValidRows);
    }
    Ok(ParsedBatch { fares, rejected })
}

fn parse_row(line: &str, id: String) -> Option<Fare> {
    let fields = split_fields(line);
    let [destination, region, meter, counter] = match fields.get(..4)? {
        [a, b, c, d] => [a.trim(), b.trim(), c.trim(), d.trim()],
        _ => return None,
    };
    if [destination, region, meter, counter].iter().any(|f| f.is_empty()) {
        return None;
    }

    Some(Fare {
        id,
        region: region.to_string(),
        destination: destination.to_string(),
        meter_value: parse_amount(meter)?,
        counter_value: parse_amount(counter)?,
    })
}

fn parse_amount(field: &str) -> Option<f64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Splits one line on commas. A field that opens with `"` runs to the matching
/// closing quote and may contain commas; `""` inside it is a literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_field_start => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
                continue;
            }
            _ => field.push(c),
        }
        at_field_start = false;
    }
    fields.push(field);
    fields
}

/// Renders the table for download: BOM, header, one quoted row per fare.
pub fn serialize(fares: &[Fare]) -> String {
    let rows: Vec<String> = fares
        .iter()
        .map(|fare| {
            format!(
                "{},{},{:.2},{:.2}",
                quote(&fare.destination),
                quote(&fare.region),
                fare.meter_value,
                fare.counter_value
            )
        })
        .collect();
    format!("{BOM}{HEADER}\n{}", rows.join("\n"))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn template() -> CsvFile {
    CsvFile {
        file_name: TEMPLATE_FILE_NAME.to_string(),
        content: format!(
            "{HEADER}\nExemplo Destino A,Zona Sul,35.50,40.00\nExemplo Destino B,Zona Norte,22.00,25.00\n"
        ),
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("export_{}.csv", date.format("%Y%m%d"))
}
