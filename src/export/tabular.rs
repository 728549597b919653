use crate::core::normalizer::normalize;
use crate::domain::model::{schema_keys, ContactRecord, Field, UntypedRecord};
use crate::utils::error::{Result, ScanError};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularOptions {
    pub include_header: bool,
    pub delimiter: u8,
}

impl TabularOptions {
    pub fn csv(include_header: bool) -> Self {
        Self {
            include_header,
            delimiter: b',',
        }
    }

    pub fn tsv(include_header: bool) -> Self {
        Self {
            include_header,
            delimiter: b'\t',
        }
    }
}

/// One row per contact, columns in schema order.
pub fn export(records: &[ContactRecord], options: &TabularOptions) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    if options.include_header {
        writer.write_record(schema_keys())?;
    }
    for record in records {
        writer.write_record(record.values())?;
    }

    writer
        .into_inner()
        .map_err(|e| ScanError::IoError(e.into_error()))
}

/// Reads an edited table back into contacts. The header row is required and is
/// matched against the schema keys; unknown columns are ignored and missing
/// columns stay empty.
pub fn import(data: &[u8], options: &TabularOptions) -> Result<Vec<ContactRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| Field::from_key(h.trim()).is_some()) {
        return Err(ScanError::InvalidInput {
            message: format!(
                "header row must name at least one of: {}",
                schema_keys().join(", ")
            ),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(normalize(&untyped_row(&headers, &row?)));
    }

    tracing::debug!("Imported {} contact(s) from table", records.len());
    Ok(records)
}

fn untyped_row(headers: &StringRecord, row: &StringRecord) -> UntypedRecord {
    headers
        .iter()
        .zip(row.iter())
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                serde_json::Value::String(value.to_string()),
            )
        })
        .collect()
}
