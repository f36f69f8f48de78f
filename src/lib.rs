//! Showreel Resolver Library
//!
//! Resolves the content of a DVD-menu style showreel site from a remotely
//! edited table. This library provides tools for:
//! - Parsing the exported CSV table into nested records
//! - Resolving `basedOn` inheritance between rows
//! - Merging a row over built-in defaults without overwriting real values
//! - Fetching the table with bounded exponential-backoff retries
//! - Emitting fire-and-forget analytics events

pub mod cli;
pub mod config;
pub mod constants;
pub mod defaults;
pub mod error;
pub mod events;
pub mod header;
pub mod merge;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod retry;
pub mod site;
pub mod source;

// Re-export commonly used types
pub use config::ResolverConfig;
pub use error::{Result, ShowreelError};
pub use merge::merge_defaults;
pub use models::{FieldValue, ListField, Record};
pub use parser::parse_table;
pub use resolver::RecordResolver;
pub use site::{SiteContent, load_site_content};
