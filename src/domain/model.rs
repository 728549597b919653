use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Decoded model output before it is projected onto the schema.
pub type UntypedRecord = serde_json::Map<String, serde_json::Value>;

/// One column of the contact schema. Declaration order is the export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Company,
    LastName,
    FirstName,
    Department,
    Address,
    Phone,
    Mobile,
    Email,
    Url,
}

pub const FIELD_COUNT: usize = 9;

pub const SCHEMA: [Field; FIELD_COUNT] = [
    Field::Company,
    Field::LastName,
    Field::FirstName,
    Field::Department,
    Field::Address,
    Field::Phone,
    Field::Mobile,
    Field::Email,
    Field::Url,
];

impl Field {
    /// Key used in the extraction prompt, in model output and as the tabular header.
    pub fn key(self) -> &'static str {
        match self {
            Field::Company => "Firma",
            Field::LastName => "Name",
            Field::FirstName => "Vorname",
            Field::Department => "Abteilung",
            Field::Address => "Adresse",
            Field::Phone => "Telefon",
            Field::Mobile => "Mobil",
            Field::Email => "Email",
            Field::Url => "URL",
        }
    }

    pub fn position(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<Field> {
        SCHEMA.iter().copied().find(|field| field.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn schema_keys() -> [&'static str; FIELD_COUNT] {
    SCHEMA.map(Field::key)
}

/// A schema-conformant contact. Every slot holds a string; empty means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    values: [String; FIELD_COUNT],
}

impl ContactRecord {
    pub fn from_values(values: [String; FIELD_COUNT]) -> Self {
        Self { values }
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.position()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.position()] = value.into();
    }

    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        SCHEMA.iter().map(move |field| (*field, self.get(*field)))
    }

    /// A card without surname and company has nothing to file it under.
    pub fn is_addressable(&self) -> bool {
        !self.get(Field::LastName).is_empty() || !self.get(Field::Company).is_empty()
    }
}

impl Serialize for ContactRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

/// Image handed to the inference boundary.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub prompt: String,
}

/// Raw text answer of one model call and the tokens it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResponse {
    pub text: String,
    pub tokens_used: u64,
}

/// Outcome of one successful extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<ContactRecord>,
    pub tokens_used: u64,
    pub model: String,
}
