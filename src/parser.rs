//! Delimited-text table parsing into client records.
//!
//! The first line is the header, every following line one record. Values are
//! split naively on the delimiter (no quoting) and trimmed. Parsing never
//! fails: short rows leave blank fields, and input without a data line
//! yields no records.

use crate::constants::DEFAULT_DELIMITER;
use crate::header::{ColumnKey, ColumnLayout};
use crate::models::{FieldValue, ParseResult, ParseStats, Record};
use tracing::{debug, warn};

/// Parser for exported content tables
#[derive(Debug, Clone, Copy)]
pub struct TableParser {
    delimiter: char,
}

impl Default for TableParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl TableParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Decode a table into one record per data line, in file order
    pub fn parse(&self, text: &str) -> ParseResult {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.trim().split('\n').collect();
        if lines.len() < 2 {
            warn!("CSV is empty or only contains headers.");
            return ParseResult::default();
        }

        let layout = ColumnLayout::from_header_line(lines[0], self.delimiter);
        let mut stats = ParseStats {
            ignored_columns: layout.ignored_headers(),
            ..ParseStats::default()
        };

        let mut records = Vec::with_capacity(lines.len() - 1);
        for (line_num, line) in lines.iter().enumerate().skip(1) {
            let values: Vec<&str> = line.split(self.delimiter).map(str::trim).collect();

            if values.len() < layout.len() {
                stats.short_rows += 1;
                debug!(
                    "Line {} has {} values for {} columns; missing values left blank",
                    line_num + 1,
                    values.len(),
                    layout.len()
                );
            } else if values.len() > layout.len() {
                stats.long_rows += 1;
                debug!(
                    "Line {} has {} values for {} columns; extra values dropped",
                    line_num + 1,
                    values.len(),
                    layout.len()
                );
            }

            records.push(build_record(&layout, &values));
        }

        stats.data_rows = records.len();
        if stats.short_rows > 0 || stats.long_rows > 0 {
            warn!(
                "{} of {} rows did not match the header width ({} short, {} long)",
                stats.short_rows + stats.long_rows,
                stats.data_rows,
                stats.short_rows,
                stats.long_rows
            );
        }

        ParseResult { records, stats }
    }
}

/// Parse with the default delimiter
pub fn parse_table(text: &str) -> ParseResult {
    TableParser::default().parse(text)
}

fn build_record(layout: &ColumnLayout, values: &[&str]) -> Record {
    let mut record = Record::with_lists();

    for (index, column) in layout.columns().iter().enumerate() {
        let value = values
            .get(index)
            .map(|v| FieldValue::text(*v))
            .unwrap_or(FieldValue::Blank);

        match column {
            ColumnKey::Scalar(name) => {
                record.insert(name.as_str(), value);
            }
            ColumnKey::Indexed {
                list,
                position,
                property,
            } => {
                let items = record.list_mut(*list);
                if items.len() <= *position {
                    items.resize(*position + 1, FieldValue::Blank);
                }
                let slot = &mut items[*position];
                if !matches!(slot, FieldValue::Record(_)) {
                    *slot = FieldValue::Record(Record::new());
                }
                if let FieldValue::Record(entry) = slot {
                    entry.insert(property.as_str(), value);
                }
            }
            ColumnKey::Ignored { .. } => {}
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListField;

    const SAMPLE: &str = "rowId,basedOn,siteTitle,chapter1.title,chapter1.vimeoId,specialFeature2.text\n\
                          1,,Brother Brother,Make it Count,1017849814,About Us\n\
                          2,1,,,,\n";

    #[test]
    fn test_parse_rows_in_order() {
        let result = parse_table(SAMPLE);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.stats.data_rows, 2);
        assert_eq!(result.records[0].row_id(), Some("1"));
        assert_eq!(result.records[1].row_id(), Some("2"));
        assert_eq!(result.records[1].based_on(), Some("1"));
        assert_eq!(result.records[0].text("siteTitle"), Some("Brother Brother"));
    }

    #[test]
    fn test_indexed_columns_route_into_lists() {
        let result = parse_table(SAMPLE);
        let first = &result.records[0];

        let chapters: Vec<&Record> = first.entries(ListField::Chapters).collect();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].text("title"), Some("Make it Count"));
        assert_eq!(chapters[0].text("vimeoId"), Some("1017849814"));

        // specialFeature2 leaves a hole at position 0
        let features = first.list(ListField::SpecialFeatures);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0], FieldValue::Blank);
        assert_eq!(
            features[1].as_record().and_then(|r| r.text("text")),
            Some("About Us")
        );
    }

    #[test]
    fn test_chapter_index_is_one_based() {
        let result = parse_table("rowId,chapter2.title\n7,X");
        let chapters = result.records[0].list(ListField::Chapters);
        assert_eq!(chapters.len(), 2);
        assert_eq!(
            chapters[1].as_record().and_then(|r| r.text("title")),
            Some("X")
        );
    }

    #[test]
    fn test_sparse_chapter_leaves_leading_holes() {
        let result = parse_table("rowId,chapter3.title\n7,Third");
        let chapters = result.records[0].list(ListField::Chapters);
        assert!(chapters.len() >= 3);
        assert!(chapters[0].is_blank());
        assert!(chapters[1].is_blank());
    }

    #[test]
    fn test_lists_always_initialized() {
        let result = parse_table("rowId,siteTitle\n1,Title");
        let record = &result.records[0];
        for list in ListField::ALL {
            assert_eq!(
                record.get(list.field_name()),
                Some(&FieldValue::List(Vec::new()))
            );
        }
    }

    #[test]
    fn test_short_rows_become_blank() {
        let result = parse_table("rowId,siteTitle,chapter1.title\n5");
        let record = &result.records[0];
        assert_eq!(result.stats.short_rows, 1);
        assert_eq!(record.row_id(), Some("5"));
        assert_eq!(record.get("siteTitle"), Some(&FieldValue::Blank));
        assert!(record.is_blank("siteTitle"));
        let chapter = record.list(ListField::Chapters)[0].as_record().unwrap();
        assert!(chapter.is_blank("title"));
    }

    #[test]
    fn test_long_rows_drop_extra_values() {
        let result = parse_table("rowId\n5,extra,values");
        assert_eq!(result.stats.long_rows, 1);
        assert_eq!(result.records[0].len(), 4); // rowId + three lists
    }

    #[test]
    fn test_values_and_headers_trimmed_with_crlf() {
        let result = parse_table("rowId , siteTitle\r\n 3 ,  Spaced Title \r\n");
        let record = &result.records[0];
        assert_eq!(record.row_id(), Some("3"));
        assert_eq!(record.text("siteTitle"), Some("Spaced Title"));
    }

    #[test]
    fn test_byte_order_mark_stripped_from_header() {
        let result = parse_table("\u{feff}rowId,title\n1,One\n2,Two\n");
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].row_id(), Some("2"));
        assert_eq!(result.records[1].text("title"), Some("Two"));
        assert!(result.records[0].get("\u{feff}rowId").is_none());
    }

    #[test]
    fn test_blank_row_id_is_kept() {
        let result = parse_table("rowId,siteTitle\n,Orphan\n1,Main");
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].row_id(), None);
        assert_eq!(result.records[0].text("siteTitle"), Some("Orphan"));
    }

    #[test]
    fn test_header_only_or_empty_input() {
        assert!(parse_table("").records.is_empty());
        assert!(parse_table("   \n  ").records.is_empty());
        assert!(parse_table("rowId,siteTitle\n").records.is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let result = TableParser::new(';').parse("rowId;chapter1.title\n9;Semi, colon");
        let chapter = result.records[0].list(ListField::Chapters)[0]
            .as_record()
            .unwrap();
        assert_eq!(chapter.text("title"), Some("Semi, colon"));
    }

    #[test]
    fn test_ignored_columns_reported() {
        let result = parse_table("rowId,chapter0.title\n1,Lost");
        assert_eq!(result.stats.ignored_columns, vec!["chapter0.title"]);
        assert!(result.records[0].list(ListField::Chapters).is_empty());
    }
}
