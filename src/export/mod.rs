pub mod tabular;
pub mod vcard;

use crate::domain::model::ContactRecord;
use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "tsv")]
    Tsv,
    #[serde(rename = "vcf")]
    Vcard,
    #[serde(rename = "vcf-zip")]
    VcardArchive,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Tsv,
        ExportFormat::Vcard,
        ExportFormat::VcardArchive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Vcard => "vcf",
            ExportFormat::VcardArchive => "vcf-zip",
        }
    }

    /// Output file name for a given stem.
    pub fn file_name(self, stem: &str) -> String {
        match self {
            ExportFormat::Csv => format!("{}.csv", stem),
            ExportFormat::Tsv => format!("{}.tsv", stem),
            ExportFormat::Vcard => format!("{}.vcf", stem),
            ExportFormat::VcardArchive => format!("{}_vcards.zip", stem),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.name() == wanted)
            .ok_or_else(|| ScanError::InvalidConfigValueError {
                field: "formats".to_string(),
                value: s.to_string(),
                reason: "Valid formats: csv, tsv, vcf, vcf-zip".to_string(),
            })
    }
}

/// Serializes a snapshot of the contact list in the requested format.
pub fn export(format: ExportFormat, records: &[ContactRecord], include_header: bool) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => tabular::export(records, &tabular::TabularOptions::csv(include_header)),
        ExportFormat::Tsv => tabular::export(records, &tabular::TabularOptions::tsv(include_header)),
        ExportFormat::Vcard => Ok(vcard::export_document(records).into_bytes()),
        ExportFormat::VcardArchive => vcard::export_archive(records),
    }
}
