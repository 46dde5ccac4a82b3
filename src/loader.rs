//! Reading vendor records from CSV or JSON imports and writing enriched output.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::config::CsvOptions;
use crate::error::{EnrichError, Result};
use crate::record::VendorRecord;

/// Parse CSV with a header row into vendor records.
///
/// Every cell becomes a string field named after its column. With
/// `ignore_empty`, empty cells are left out of the record entirely.
pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<Vec<VendorRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut record = VendorRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if options.ignore_empty && cell.is_empty() {
                continue;
            }
            record.insert(header.clone(), Value::String(cell.to_string()));
        }
        records.push(record);
    }

    Ok(records)
}

/// Parse a JSON array of objects into vendor records.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<VendorRecord>> {
    let value: Value = serde_json::from_reader(reader)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EnrichError::type_error(
                "vendors",
                format!("expected a JSON array of records, got {}", other),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(EnrichError::type_error(
                format!("vendors[{}]", index),
                format!("each record must be an object. Invalid value: {}", other),
            )),
        })
        .collect()
}

/// Load records from a `.csv` or `.json` file.
pub fn load_records(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Vec<VendorRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let file = BufReader::new(File::open(path)?);
    let records = match extension.as_deref() {
        Some("csv") => read_csv(file, options)?,
        Some("json") => read_json(file)?,
        _ => {
            return Err(EnrichError::Config(format!(
                "Unsupported input format for '{}': expected .csv or .json",
                path.display()
            )))
        }
    };

    info!(path = %path.display(), records = records.len(), "Loaded vendor records");
    Ok(records)
}

/// Write records as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, records: &[VendorRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_CSV: &str = "contractNumber,buyerContact,supplierZip,certified\n\
TG-001-08,\"wilsont@vt.edu, (540) 231-7402\",24068,yes\n\
,,22152,\n";

    #[test]
    fn test_read_csv_ignores_empty_cells() {
        let records = read_csv(SAMPLE_CSV.as_bytes(), &CsvOptions { ignore_empty: true }).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            Value::Object(records[0].clone()),
            json!({
                "contractNumber": "TG-001-08",
                "buyerContact": "wilsont@vt.edu, (540) 231-7402",
                "supplierZip": "24068",
                "certified": "yes"
            })
        );
        assert_eq!(Value::Object(records[1].clone()), json!({"supplierZip": "22152"}));
    }

    #[test]
    fn test_read_csv_keeps_empty_cells() {
        let records = read_csv(SAMPLE_CSV.as_bytes(), &CsvOptions { ignore_empty: false }).unwrap();
        assert_eq!(records[1]["contractNumber"], json!(""));
        assert_eq!(records[1].len(), 4);
    }

    #[test]
    fn test_read_json_requires_array_of_objects() {
        let records = read_json(r#"[{"supplierZip": "24068"}]"#.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);

        let err = read_json(r#"{"supplierZip": "24068"}"#.as_bytes()).unwrap_err();
        assert!(err.is_type_error());

        let err = read_json(r#"[{"supplierZip": "24068"}, 3]"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("vendors[1]"));
    }

    #[test]
    fn test_write_json_round_trips_field_order() {
        let records = read_csv(SAMPLE_CSV.as_bytes(), &CsvOptions::default()).unwrap();
        let mut out = Vec::new();
        write_json(&mut out, &records).unwrap();

        let text = String::from_utf8(out).unwrap();
        let contract = text.find("contractNumber").unwrap();
        let zip = text.find("supplierZip").unwrap();
        assert!(contract < zip);
    }
}
