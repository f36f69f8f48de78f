//! Core data structures for showreel content resolution.
//!
//! Defines the semi-structured client record, the three positional list
//! fields it always carries, and the statistics reported by parsing and
//! resolution.

use crate::constants::{BASED_ON_FIELD, ROW_ID_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field of a record
///
/// `Blank` stands for a value that was never supplied: a missing trailing
/// column, or a hole in a list whose later positions were populated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Blank,
    Text(String),
    List(Vec<FieldValue>),
    Record(Record),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Blank for merge purposes: never supplied, or an empty string.
    /// Whitespace-only text counts as set.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Blank => true,
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(_) | FieldValue::Record(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The items of this value, replacing a non-list value with an empty list
    fn coerce_list(&mut self) -> &mut Vec<FieldValue> {
        match self {
            FieldValue::List(items) => items,
            other => {
                *other = FieldValue::List(Vec::new());
                other.coerce_list()
            }
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Record(value)
    }
}

/// One client's content configuration, or one entry of a list field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with the three list fields present and empty
    pub fn with_lists() -> Self {
        let mut record = Self::new();
        for list in ListField::ALL {
            record.insert(list.field_name(), FieldValue::List(Vec::new()));
        }
        record
    }

    /// Builder-style text assignment, used for static content and tests
    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.insert(key, FieldValue::text(value));
        self
    }

    /// Builder-style append of a sub-record to one of the list fields
    pub fn with_entry(mut self, list: ListField, entry: Record) -> Self {
        self.list_mut(list).push(FieldValue::Record(entry));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-blank text value of a field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(FieldValue::as_text)
            .filter(|text| !text.is_empty())
    }

    /// Whether a field is absent or blank
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).is_none_or(FieldValue::is_blank)
    }

    pub fn row_id(&self) -> Option<&str> {
        self.text(ROW_ID_FIELD)
    }

    pub fn based_on(&self) -> Option<&str> {
        self.text(BASED_ON_FIELD)
    }

    /// Items of a list field; empty when the field is absent or not a list
    pub fn list(&self, list: ListField) -> &[FieldValue] {
        self.get(list.field_name())
            .and_then(FieldValue::as_list)
            .unwrap_or(&[])
    }

    /// Present sub-records of a list field, skipping holes
    pub fn entries(&self, list: ListField) -> impl Iterator<Item = &Record> {
        self.list(list).iter().filter_map(FieldValue::as_record)
    }

    /// Mutable access to a list field, replacing a non-list value with an empty list
    pub fn list_mut(&mut self, list: ListField) -> &mut Vec<FieldValue> {
        self.list_field_mut(list.field_name())
    }

    /// Mutable access to the list stored under `key`, replacing a non-list value
    pub fn list_field_mut(&mut self, key: &str) -> &mut Vec<FieldValue> {
        self.fields
            .entry(key.to_string())
            .or_insert_with(|| FieldValue::List(Vec::new()))
            .coerce_list()
    }
}

/// The positional list fields every record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListField {
    Chapters,
    SpecialFeatures,
    Pagination,
}

impl ListField {
    pub const ALL: [ListField; 3] = [
        ListField::Chapters,
        ListField::SpecialFeatures,
        ListField::Pagination,
    ];

    /// Record key holding the list
    pub fn field_name(&self) -> &'static str {
        match self {
            ListField::Chapters => "chapters",
            ListField::SpecialFeatures => "specialFeatures",
            ListField::Pagination => "pagination",
        }
    }

    /// Column header prefix routing values into the list
    pub fn header_prefix(&self) -> &'static str {
        match self {
            ListField::Chapters => "chapter",
            ListField::SpecialFeatures => "specialFeature",
            ListField::Pagination => "pagination",
        }
    }

    /// Property a sub-record must carry to be kept after resolution
    pub fn defining_field(&self) -> &'static str {
        match self {
            ListField::Chapters => "title",
            ListField::SpecialFeatures => "text",
            ListField::Pagination => "name",
        }
    }

    pub fn from_header_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|list| list.header_prefix() == prefix)
    }
}

/// Statistics collected while parsing a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data lines decoded into records
    pub data_rows: usize,
    /// Data lines with fewer values than headers
    pub short_rows: usize,
    /// Data lines with more values than headers
    pub long_rows: usize,
    /// Headers that looked indexed but could not be routed
    pub ignored_columns: Vec<String>,
}

/// Result of parsing a table
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Statistics from `basedOn` inheritance resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Passes executed, including the final unchanged one
    pub passes: usize,
    /// Whether a pass after the first produced no changes
    pub converged: bool,
    /// Records whose `basedOn` names no indexed record
    pub unresolved_references: usize,
    /// Records left out of the lookup index for a repeated `rowId`
    pub duplicate_row_ids: usize,
}

/// How the returned record was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// The requested id was found
    Requested,
    /// The requested id was missing; the fallback id was used
    FallbackId,
    /// Neither id was found; the first record in table order was used
    FirstRecord,
}

/// A record selected from a resolved table, before defaults are merged
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub record: Record,
    pub selection: Selection,
    /// Fetch attempts made, including the successful one
    pub attempts: u32,
    pub parse_stats: ParseStats,
    pub resolution_stats: ResolutionStats,
}
