//! Column header grammar for exported content tables.
//!
//! A header is either a plain field name (`rowId`, `basedOn`, `siteTitle`, ...)
//! or an indexed list column of the form `<prefix><n>.<property>`, where the
//! prefix names one of the record's list fields and `n` is a 1-based position:
//!
//! ```text
//! chapter2.title        -> chapters[1].title
//! specialFeature1.url   -> specialFeatures[0].url
//! pagination3.name      -> pagination[2].name
//! ```

use crate::constants::MAX_LIST_INDEX;
use crate::models::ListField;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static INDEXED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(chapter|specialFeature|pagination)(\d+)\.(.+)$")
        .expect("indexed header pattern is valid")
});

/// Where the values of one column are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKey {
    /// Plain record field
    Scalar(String),
    /// Property of the sub-record at a 0-based position of a list field
    Indexed {
        list: ListField,
        position: usize,
        property: String,
    },
    /// Indexed header whose position cannot be routed
    Ignored { header: String, reason: String },
}

impl ColumnKey {
    /// Classify a single (already trimmed) header
    pub fn parse(header: &str) -> Self {
        let Some(caps) = INDEXED_HEADER.captures(header) else {
            return ColumnKey::Scalar(header.to_string());
        };

        let list = match ListField::from_header_prefix(&caps[1]) {
            Some(list) => list,
            None => return ColumnKey::Scalar(header.to_string()),
        };

        let index = match caps[2].parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                return ColumnKey::Ignored {
                    header: header.to_string(),
                    reason: format!("position '{}' is not a valid number", &caps[2]),
                };
            }
        };

        if index == 0 || index > MAX_LIST_INDEX {
            return ColumnKey::Ignored {
                header: header.to_string(),
                reason: format!("position {} outside 1..={}", index, MAX_LIST_INDEX),
            };
        }

        ColumnKey::Indexed {
            list,
            position: index - 1,
            property: caps[3].to_string(),
        }
    }
}

/// Column keys of a table, in header order
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    columns: Vec<ColumnKey>,
}

impl ColumnLayout {
    /// Split and classify a header line
    pub fn from_header_line(line: &str, delimiter: char) -> Self {
        let columns: Vec<ColumnKey> = line
            .split(delimiter)
            .map(|header| ColumnKey::parse(header.trim()))
            .collect();

        for column in &columns {
            if let ColumnKey::Ignored { header, reason } = column {
                warn!("Ignoring column '{}': {}", header, reason);
            }
        }

        debug!(
            "Header layout: {} columns ({} indexed)",
            columns.len(),
            columns
                .iter()
                .filter(|c| matches!(c, ColumnKey::Indexed { .. }))
                .count()
        );

        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Headers that were recognised as indexed but could not be routed
    pub fn ignored_headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|column| match column {
                ColumnKey::Ignored { header, .. } => Some(header.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_headers() {
        assert_eq!(
            ColumnKey::parse("rowId"),
            ColumnKey::Scalar("rowId".to_string())
        );
        assert_eq!(
            ColumnKey::parse("mainMenuTitle"),
            ColumnKey::Scalar("mainMenuTitle".to_string())
        );
        // No dot after the index
        assert_eq!(
            ColumnKey::parse("chapter1"),
            ColumnKey::Scalar("chapter1".to_string())
        );
        // Prefix is case sensitive
        assert_eq!(
            ColumnKey::parse("Chapter1.title"),
            ColumnKey::Scalar("Chapter1.title".to_string())
        );
    }

    #[test]
    fn test_indexed_headers() {
        assert_eq!(
            ColumnKey::parse("chapter2.title"),
            ColumnKey::Indexed {
                list: ListField::Chapters,
                position: 1,
                property: "title".to_string(),
            }
        );
        assert_eq!(
            ColumnKey::parse("specialFeature1.url"),
            ColumnKey::Indexed {
                list: ListField::SpecialFeatures,
                position: 0,
                property: "url".to_string(),
            }
        );
        assert_eq!(
            ColumnKey::parse("pagination12.name"),
            ColumnKey::Indexed {
                list: ListField::Pagination,
                position: 11,
                property: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_property_keeps_trailing_dots() {
        assert_eq!(
            ColumnKey::parse("chapter1.meta.alt"),
            ColumnKey::Indexed {
                list: ListField::Chapters,
                position: 0,
                property: "meta.alt".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_positions_are_ignored() {
        assert!(matches!(
            ColumnKey::parse("chapter0.title"),
            ColumnKey::Ignored { .. }
        ));
        assert!(matches!(
            ColumnKey::parse("chapter257.title"),
            ColumnKey::Ignored { .. }
        ));
        assert!(matches!(
            ColumnKey::parse("chapter99999999999999999999999.title"),
            ColumnKey::Ignored { .. }
        ));
    }

    #[test]
    fn test_layout_trims_headers() {
        let layout = ColumnLayout::from_header_line(" rowId , chapter1.title ,chapter0.x\r", ',');
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.columns()[0], ColumnKey::Scalar("rowId".to_string()));
        assert!(matches!(
            layout.columns()[1],
            ColumnKey::Indexed { position: 0, .. }
        ));
        assert_eq!(layout.ignored_headers(), vec!["chapter0.x".to_string()]);
    }
}
