use crate::domain::model::{ContactRecord, Field};
use crate::utils::error::Result;
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;
use zip::write::{FileOptions, ZipWriter};

const CRLF: &str = "\r\n";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid pattern"));

/// Escapes a vCard 3.0 text value.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// URI values are not text-escaped, but must stay on one content line.
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .collect::<Vec<_>>()
        .concat()
}

fn display_name(record: &ContactRecord) -> String {
    let full = format!(
        "{} {}",
        record.get(Field::FirstName),
        record.get(Field::LastName)
    );
    let full = full.trim();
    if full.is_empty() {
        record.get(Field::Company).to_string()
    } else {
        full.to_string()
    }
}

/// Renders one contact as a vCard 3.0 block terminated by CRLF.
pub fn render_card(record: &ContactRecord) -> String {
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!(
            "N:{};{};;;",
            escape(record.get(Field::LastName)),
            escape(record.get(Field::FirstName))
        ),
        format!("FN:{}", escape(&display_name(record))),
    ];

    let company = record.get(Field::Company);
    let department = record.get(Field::Department);
    if !department.is_empty() {
        lines.push(format!("ORG:{};{}", escape(company), escape(department)));
    } else if !company.is_empty() {
        lines.push(format!("ORG:{}", escape(company)));
    }

    let optional = [
        (Field::Phone, "TEL;TYPE=WORK,VOICE:"),
        (Field::Mobile, "TEL;TYPE=CELL:"),
        (Field::Email, "EMAIL;TYPE=INTERNET,WORK:"),
    ];
    for (field, property) in optional {
        let value = record.get(field);
        if !value.is_empty() {
            lines.push(format!("{}{}", property, escape(value)));
        }
    }

    let address = record.get(Field::Address);
    if !address.is_empty() {
        lines.push(format!("ADR;TYPE=WORK:;;{};;;;", escape(address)));
    }
    let url = record.get(Field::Url);
    if !url.is_empty() {
        lines.push(format!("URL:{}", single_line(url)));
    }

    lines.push("END:VCARD".to_string());

    let mut card = lines.join(CRLF);
    card.push_str(CRLF);
    card
}

fn exportable(records: &[ContactRecord]) -> impl Iterator<Item = &ContactRecord> {
    records.iter().filter(|record| {
        let keep = record.is_addressable();
        if !keep {
            tracing::debug!("Skipping contact without name and company");
        }
        keep
    })
}

/// All exportable contacts in one document, blocks separated by a blank line.
pub fn export_document(records: &[ContactRecord]) -> String {
    exportable(records)
        .map(render_card)
        .collect::<Vec<_>>()
        .join(CRLF)
}

/// File name of the `position`-th (1-based) card inside an archive.
pub fn entry_name(position: usize, record: &ContactRecord) -> String {
    let base = if record.get(Field::LastName).is_empty() {
        record.get(Field::Company)
    } else {
        record.get(Field::LastName)
    };
    let sanitized = UNSAFE_NAME_CHARS.replace_all(base, "_");
    let sanitized = sanitized.trim_matches('_');
    let sanitized = if sanitized.is_empty() { "contact" } else { sanitized };
    format!("{:02}_{}.vcf", position, sanitized)
}

/// A zip archive holding one named `.vcf` entry per exportable contact.
pub fn export_archive(records: &[ContactRecord]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (index, record) in exportable(records).enumerate() {
        let name = entry_name(index + 1, record);
        tracing::debug!("Adding {} to vCard archive", name);
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(render_card(record).as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
