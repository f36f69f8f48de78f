//! Application constants for the showreel resolver
//!
//! This module contains the remote source location, retry timings,
//! resolution bounds and the field names shared by the parser, the
//! resolver and the site loader.

// =============================================================================
// Remote Sources
// =============================================================================

/// Published spreadsheet export holding one content row per client
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRnDZiD0zbEjdALbE4BPJrGUvnC3jK4mK4uebn2kLjajcgCbXQsE5xBG9a0R1wxn9WJo-ogpLC3p-X0/pub?gid=1534684239&single=true&output=csv";

/// Column delimiter of the exported table
pub const DEFAULT_DELIMITER: char = ',';

/// HTTP request timeout for the table fetch, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Retry and Resolution Bounds
// =============================================================================

/// Total fetch attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled after every further failure
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Upper bound on `basedOn` resolution passes
pub const MAX_RESOLUTION_PASSES: usize = 5;

/// Highest 1-based position accepted in an indexed column header
pub const MAX_LIST_INDEX: usize = 256;

// =============================================================================
// Record Fields
// =============================================================================

/// Unique key of a record
pub const ROW_ID_FIELD: &str = "rowId";

/// Reference to the parent record a row inherits blank fields from
pub const BASED_ON_FIELD: &str = "basedOn";

/// Row selected when the requested id is not in the table
pub const FALLBACK_ROW_ID: &str = "1";

/// Site version used when the visitor supplies no identifier
pub const DEFAULT_SITE_VERSION_ID: &str = "1";

// =============================================================================
// Analytics Events
// =============================================================================

/// Event emitted once per site load
pub const SITE_LOAD_EVENT: &str = "site_load";

// =============================================================================
// Environment Overrides
// =============================================================================

pub const ENV_SOURCE_URL: &str = "SHOWREEL_SOURCE_URL";
pub const ENV_EVENT_ENDPOINT: &str = "SHOWREEL_EVENT_ENDPOINT";

/// Application directory under the platform config directory
pub const CONFIG_DIR_NAME: &str = "showreel";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";
