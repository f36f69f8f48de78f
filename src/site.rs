//! Site content: the resolved record handed to presentation.
//!
//! A [`SiteContent`] is built once per page load and passed explicitly to
//! whatever renders the menus. It owns the final record: the remote
//! selection merged over the built-in defaults, with list fields compacted.

use crate::constants::{DEFAULT_SITE_VERSION_ID, SITE_LOAD_EVENT};
use crate::events::{EventSink, SiteEvent};
use crate::merge::{compact_lists, merge_defaults};
use crate::models::{ListField, Record, ResolvedRecord, Selection};
use crate::resolver::RecordResolver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

/// Where the content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentOrigin {
    /// A row of the remote table, filled in from defaults
    Remote { selection: Selection, attempts: u32 },
    /// Built-in defaults only
    DefaultsOnly,
}

/// Content for one site version
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub site_version_id: String,
    pub origin: ContentOrigin,
    pub loaded_at: DateTime<Utc>,
    pub record: Record,
}

impl SiteContent {
    /// Final content from an optional remote selection and the defaults
    pub fn assemble(site_version_id: &str, resolved: Option<ResolvedRecord>, defaults: &Record) -> Self {
        let (mut record, origin) = match resolved {
            Some(resolved) => {
                let mut record = resolved.record;
                merge_defaults(&mut record, defaults);
                (
                    record,
                    ContentOrigin::Remote {
                        selection: resolved.selection,
                        attempts: resolved.attempts,
                    },
                )
            }
            None => (defaults.clone(), ContentOrigin::DefaultsOnly),
        };
        compact_lists(&mut record);

        Self {
            site_version_id: site_version_id.to_string(),
            origin,
            loaded_at: Utc::now(),
            record,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.record.text(key)
    }

    pub fn chapters(&self) -> impl Iterator<Item = &Record> {
        self.record.entries(ListField::Chapters)
    }

    pub fn special_features(&self) -> impl Iterator<Item = &Record> {
        self.record.entries(ListField::SpecialFeatures)
    }

    pub fn pagination(&self) -> impl Iterator<Item = &Record> {
        self.record.entries(ListField::Pagination)
    }
}

/// Resolve content for a requested site version, degrading to defaults.
///
/// A blank request uses the default site version. Fetch failures and empty
/// tables never fail the load. One `site_load` event is emitted.
pub async fn load_site_content(
    resolver: &RecordResolver,
    requested_id: Option<&str>,
    defaults: &Record,
    events: &dyn EventSink,
) -> SiteContent {
    let site_version_id = requested_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SITE_VERSION_ID);

    let resolved = match resolver.resolve(site_version_id).await {
        Ok(Some(resolved)) => Some(resolved),
        Ok(None) => {
            warn!("Content table has no records. Using ONLY built-in defaults.");
            None
        }
        Err(e) => {
            warn!("{}. Using ONLY built-in defaults.", e);
            None
        }
    };

    let content = SiteContent::assemble(site_version_id, resolved, defaults);
    info!(
        "Site content ready for '{}' ({:?}): {} chapters, {} special features",
        content.site_version_id,
        content.origin,
        content.chapters().count(),
        content.special_features().count()
    );

    events.log_event(SiteEvent::new(
        SITE_LOAD_EVENT,
        json!({
            "id": content.site_version_id,
            "origin": content.origin,
        }),
    ));

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::defaults::default_site_record;
    use crate::events::testing::RecordingSink;
    use crate::models::FieldValue;
    use crate::retry::testing::RecordingSleeper;
    use crate::source::testing::ScriptedSource;
    use std::sync::Arc;

    fn resolver_for(source: ScriptedSource) -> RecordResolver {
        RecordResolver::new(Arc::new(source), &ResolverConfig::default())
            .with_sleeper(Arc::new(RecordingSleeper::default()))
    }

    const TABLE: &str = "rowId,basedOn,mainMenuTitle,chapter1.title,chapter1.vimeoId,chapter2.vimeoId,specialFeature1.text\n\
                         1,,ACME FILMS,,,,\n\
                         2,1,,Client Cut,555,777,Say Hello\n";

    #[tokio::test]
    async fn test_remote_record_merged_over_defaults() {
        let resolver = resolver_for(ScriptedSource::always(TABLE));
        let sink = RecordingSink::default();
        let defaults = default_site_record();

        let content = load_site_content(&resolver, Some("2"), &defaults, &sink).await;

        assert_eq!(content.site_version_id, "2");
        assert_eq!(
            content.origin,
            ContentOrigin::Remote {
                selection: Selection::Requested,
                attempts: 1
            }
        );
        // Inherited from row 1, not the defaults
        assert_eq!(content.text("mainMenuTitle"), Some("ACME FILMS"));
        // Filled from defaults
        assert_eq!(content.text("mainMenuSubtitle"), Some("THE SHOWREEL"));

        let chapters: Vec<&Record> = content.chapters().collect();
        assert_eq!(chapters.len(), 4);
        assert_eq!(chapters[0].text("title"), Some("Client Cut"));
        assert_eq!(chapters[0].text("vimeoId"), Some("555"));
        assert_eq!(
            chapters[0].text("thumbnailUrl"),
            Some("assets/make-it-count-thumbnail.gif")
        );
        // Title from defaults, own video id kept
        assert_eq!(chapters[1].text("title"), Some("DATASNIPPERS - Sandcastles"));
        assert_eq!(chapters[1].text("vimeoId"), Some("777"));

        let features: Vec<&str> = content
            .special_features()
            .filter_map(|f| f.text("text"))
            .collect();
        assert_eq!(features, vec!["Say Hello", "About Us", "Instagram", "Easter Eggs"]);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "site_load");
        assert_eq!(events[0].data["id"], "2");
    }

    #[tokio::test]
    async fn test_fetch_failure_uses_defaults_only() {
        let resolver = resolver_for(ScriptedSource::always_failing());
        let sink = RecordingSink::default();
        let defaults = default_site_record();

        let content = load_site_content(&resolver, Some("2"), &defaults, &sink).await;

        assert_eq!(content.origin, ContentOrigin::DefaultsOnly);
        assert_eq!(content.record, defaults);
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_request_uses_default_version() {
        let resolver = resolver_for(ScriptedSource::always(TABLE));
        let sink = RecordingSink::default();

        let content = load_site_content(&resolver, Some("  "), &default_site_record(), &sink).await;
        assert_eq!(content.site_version_id, "1");
        assert_eq!(content.text("mainMenuTitle"), Some("ACME FILMS"));

        let content = load_site_content(&resolver, None, &default_site_record(), &sink).await;
        assert_eq!(content.site_version_id, "1");
    }

    #[test]
    fn test_assemble_compacts_placeholders() {
        let mut remote = Record::with_lists();
        remote.list_mut(ListField::Pagination).extend([
            FieldValue::Blank,
            FieldValue::Record(Record::new().with_text("url", "/next")),
            FieldValue::Record(Record::new().with_text("name", "Next")),
        ]);
        let resolved = ResolvedRecord {
            record: remote,
            selection: Selection::FirstRecord,
            attempts: 2,
            parse_stats: Default::default(),
            resolution_stats: Default::default(),
        };

        let content = SiteContent::assemble("9", Some(resolved), &Record::with_lists());
        let pages: Vec<&Record> = content.pagination().collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text("name"), Some("Next"));
    }

    #[test]
    fn test_defaults_are_not_mutated_by_assembly() {
        let defaults = default_site_record();
        let snapshot = defaults.clone();
        let resolved = ResolvedRecord {
            record: Record::with_lists().with_text("siteTitle", "Client"),
            selection: Selection::Requested,
            attempts: 1,
            parse_stats: Default::default(),
            resolution_stats: Default::default(),
        };

        let content = SiteContent::assemble("3", Some(resolved), &defaults);
        assert_eq!(content.text("siteTitle"), Some("Client"));
        assert_eq!(defaults, snapshot);
    }
}
