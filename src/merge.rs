//! Blank-preserving record merge and list compaction.
//!
//! `merge_defaults` copies values from a source record into a target record
//! only where the target is blank (absent, a hole, or an empty string). It is
//! used both for `basedOn` inheritance and for filling a selected record from
//! the built-in defaults.

use crate::models::{FieldValue, ListField, Record};
use tracing::debug;

/// Merge `source` into `target` without overwriting populated values.
///
/// - List fields: the target is coerced to a list, then each present source
///   item is merged positionally. Sub-records are deep-copied into missing or
///   non-record slots and merged recursively into record slots; other items
///   only fill blank slots. Holes in the source list are skipped.
/// - Nested records merge recursively when both sides are records.
/// - Anything else is assigned only when the target is blank.
///
/// Returns whether `target` changed. `source` is never modified.
pub fn merge_defaults(target: &mut Record, source: &Record) -> bool {
    let mut changed = false;
    for (key, source_value) in source.iter() {
        changed |= merge_field(target, key, source_value);
    }
    changed
}

fn merge_field(target: &mut Record, key: &str, source_value: &FieldValue) -> bool {
    match source_value {
        FieldValue::List(source_items) => {
            let was_list = matches!(target.get(key), Some(FieldValue::List(_)));
            let target_items = target.list_field_mut(key);
            let merged = merge_list(target_items, source_items);
            !was_list || merged
        }
        FieldValue::Record(source_record) => match target.get_mut(key) {
            Some(FieldValue::Record(target_record)) => merge_defaults(target_record, source_record),
            _ => fill_blank(target, key, source_value),
        },
        FieldValue::Text(_) | FieldValue::Blank => fill_blank(target, key, source_value),
    }
}

fn merge_list(target_items: &mut Vec<FieldValue>, source_items: &[FieldValue]) -> bool {
    let mut changed = false;

    for (index, source_item) in source_items.iter().enumerate() {
        if matches!(source_item, FieldValue::Blank) {
            continue;
        }

        if target_items.len() <= index {
            target_items.resize(index + 1, FieldValue::Blank);
            changed = true;
        }
        let slot = &mut target_items[index];

        match (slot, source_item) {
            (FieldValue::Record(target_entry), FieldValue::Record(source_entry)) => {
                changed |= merge_defaults(target_entry, source_entry);
            }
            (slot, FieldValue::Record(_)) => {
                *slot = source_item.clone();
                changed = true;
            }
            (slot, _) => {
                if slot.is_blank() && *slot != *source_item {
                    *slot = source_item.clone();
                    changed = true;
                }
            }
        }
    }

    changed
}

fn fill_blank(target: &mut Record, key: &str, source_value: &FieldValue) -> bool {
    if !target.is_blank(key) || matches!(source_value, FieldValue::Blank) {
        return false;
    }
    let previous = target.insert(key, source_value.clone());
    previous.as_ref() != Some(source_value)
}

/// Drop list entries lacking their defining field, keeping relative order.
///
/// Holes and non-record items are removed as well. Returns the number of
/// entries dropped.
pub fn compact_lists(record: &mut Record) -> usize {
    let mut dropped = 0;

    for list in ListField::ALL {
        let defining_field = list.defining_field();
        let items = record.list_mut(list);
        let before = items.len();
        items.retain(|item| match item {
            FieldValue::Record(entry) => !entry.is_blank(defining_field),
            _ => false,
        });
        let removed = before - items.len();
        if removed > 0 {
            debug!(
                "Dropped {} {} entries without '{}'",
                removed,
                list.field_name(),
                defining_field
            );
        }
        dropped += removed;
    }

    dropped
}
