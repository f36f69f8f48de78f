//! Record resolution: `basedOn` inheritance, selection and the fetch pipeline.
//!
//! ## Inheritance
//!
//! Every record may name a parent through `basedOn`. Resolution runs a
//! bounded number of passes over a working copy of the table. In each pass,
//! every record whose parent exists receives a blank-preserving merge from a
//! fresh copy of the parent's *originally parsed* value. Parents are never
//! read from the working set, so the order of records within a pass does not
//! matter; the trade-off is that chains deeper than one level only see the
//! values their direct parent had in the table.
//!
//! Resolution stops at the first pass after the first one that changes
//! nothing, or after the pass bound.

use crate::config::ResolverConfig;
use crate::error::{Result, ShowreelError};
use crate::merge::merge_defaults;
use crate::models::{ParseStats, Record, ResolutionStats, ResolvedRecord, Selection};
use crate::parser::TableParser;
use crate::retry::{RetryOutcome, RetryPolicy, Sleeper, TokioSleeper, retry_with_backoff};
use crate::source::{HttpTableSource, TableSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Index of records by `rowId`, built over the table as parsed.
///
/// Records with a blank `rowId` are left out; when an id repeats, the last
/// record takes over the entry. Selection still picks the first match.
pub fn build_lookup(records: &[Record]) -> (HashMap<&str, &Record>, usize) {
    let mut lookup = HashMap::with_capacity(records.len());
    let mut duplicates = 0;

    for record in records {
        let Some(row_id) = record.row_id() else {
            continue;
        };
        if lookup.insert(row_id, record).is_some() {
            warn!("Duplicate rowId '{}'; the later row is used as a basedOn parent", row_id);
            duplicates += 1;
        }
    }

    (lookup, duplicates)
}

/// Apply `basedOn` inheritance to every record, for at most `max_passes` passes
pub fn resolve_inheritance(records: &[Record], max_passes: usize) -> (Vec<Record>, ResolutionStats) {
    let (lookup, duplicates) = build_lookup(records);
    let mut resolved: Vec<Record> = records.to_vec();
    let mut stats = ResolutionStats {
        duplicate_row_ids: duplicates,
        ..ResolutionStats::default()
    };

    stats.unresolved_references = resolved
        .iter()
        .filter_map(Record::based_on)
        .filter(|parent_id| !lookup.contains_key(parent_id))
        .inspect(|parent_id| debug!("basedOn '{}' does not match any rowId", parent_id))
        .count();

    for pass in 0..max_passes {
        stats.passes = pass + 1;
        let mut changed_in_pass = false;

        for target in resolved.iter_mut() {
            let Some(parent) = target.based_on().and_then(|id| lookup.get(id)) else {
                continue;
            };
            let parent_copy = (*parent).clone();
            if merge_defaults(target, &parent_copy) {
                changed_in_pass = true;
            }
        }

        if !changed_in_pass && pass > 0 {
            info!("'basedOn' resolution complete after {} passes.", pass);
            stats.converged = true;
            break;
        }
    }

    if !stats.converged {
        debug!(
            "'basedOn' resolution stopped at the pass bound ({})",
            max_passes
        );
    }

    (resolved, stats)
}

/// Pick the requested record, else the fallback id, else the first record
pub fn select_record(
    records: Vec<Record>,
    requested_id: &str,
    fallback_id: &str,
) -> Option<(Record, Selection)> {
    let position = |id: &str| records.iter().position(|r| r.row_id() == Some(id));

    let (index, selection) = if let Some(index) = position(requested_id) {
        (index, Selection::Requested)
    } else if let Some(index) = position(fallback_id) {
        warn!(
            "Requested ID '{}' not found. Using fallback ID '{}'.",
            requested_id, fallback_id
        );
        (index, Selection::FallbackId)
    } else if !records.is_empty() {
        warn!(
            "Requested ID '{}' not found, and '{}' not found. Defaulting to first available resolved row in CSV.",
            requested_id, fallback_id
        );
        (0, Selection::FirstRecord)
    } else {
        return None;
    };

    records
        .into_iter()
        .nth(index)
        .map(|record| (record, selection))
}

/// Result of resolving one fetched table, before the fetch bookkeeping
#[derive(Debug, Clone)]
pub struct TableResolution {
    pub selected: Option<(Record, Selection)>,
    pub parse_stats: ParseStats,
    pub resolution_stats: ResolutionStats,
}

/// Fetches the content table and resolves the record for one client
pub struct RecordResolver {
    source: Arc<dyn TableSource>,
    sleeper: Arc<dyn Sleeper>,
    parser: TableParser,
    retry: RetryPolicy,
    max_passes: usize,
    fallback_row_id: String,
}

impl RecordResolver {
    pub fn new(source: Arc<dyn TableSource>, config: &ResolverConfig) -> Self {
        Self {
            source,
            sleeper: Arc::new(TokioSleeper),
            parser: TableParser::new(config.delimiter),
            retry: config.retry_policy(),
            max_passes: config.max_resolution_passes,
            fallback_row_id: config.fallback_row_id.clone(),
        }
    }

    /// Resolver over the configured HTTP source
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpTableSource::new(config.source_url.clone(), config.request_timeout())?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// Replace the delay source between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn source(&self) -> &dyn TableSource {
        self.source.as_ref()
    }

    /// Parse, resolve and select from already fetched table text
    pub fn resolve_table(&self, text: &str, requested_id: &str) -> TableResolution {
        let parsed = self.parser.parse(text);
        debug!("Parsed {} rows before resolution", parsed.records.len());

        let (resolved, resolution_stats) = resolve_inheritance(&parsed.records, self.max_passes);
        let selected = select_record(resolved, requested_id, &self.fallback_row_id);

        TableResolution {
            selected,
            parse_stats: parsed.stats,
            resolution_stats,
        }
    }

    /// Fetch with retries and resolve the record for `requested_id`.
    ///
    /// `Ok(None)` means the table held no records; an error is returned only
    /// when every fetch attempt failed.
    pub async fn resolve(&self, requested_id: &str) -> Result<Option<ResolvedRecord>> {
        info!(
            "Fetching content table from {} for '{}'",
            self.source.describe(),
            requested_id
        );

        let outcome = retry_with_backoff(&self.retry, self.sleeper.as_ref(), |attempt| {
            debug!("Fetch attempt {}", attempt);
            self.source.fetch_table()
        })
        .await;

        let (text, attempts) = match outcome {
            RetryOutcome::Succeeded { value, attempts } => (value, attempts),
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                return Err(ShowreelError::RetriesExhausted {
                    attempts,
                    last_error: last_error.to_string(),
                });
            }
        };

        let table = self.resolve_table(&text, requested_id);
        Ok(table.selected.map(|(record, selection)| ResolvedRecord {
            record,
            selection,
            attempts,
            parse_stats: table.parse_stats,
            resolution_stats: table.resolution_stats,
        }))
    }

    /// Resolve, reporting every failure as "no data"
    pub async fn fetch_record(&self, requested_id: &str) -> Option<Record> {
        match self.resolve(requested_id).await {
            Ok(Some(resolved)) => Some(resolved.record),
            Ok(None) => {
                warn!("Content table has no records");
                None
            }
            Err(e) => {
                error!("Failed to fetch data after multiple retries: {}", e);
                None
            }
        }
    }
}
