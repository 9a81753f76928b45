//! Canonical rendering of experiment records.
//!
//! The canonical string doubles as the output name: handlers persist their
//! result artifact as `<output name>.json`, and later invocations detect the
//! run by fingerprinting artifact stems.

use crate::record::ExperimentRecord;

/// Token rendered in place of an unbound field.
pub const MISSING_TOKEN: &str = "None";

/// Separator placed between consecutive field values.
pub const VALUE_SEPARATOR: char = '_';

/// Stand-in for `/` and `\\` inside values.
pub const PATH_REPLACEMENT: char = '-';

/// Renders the record values in field order as a whitespace-free string.
///
/// Whitespace inside individual values is dropped and values are joined by
/// [`VALUE_SEPARATOR`]. Field labels are not included. Path separators are
/// replaced by [`PATH_REPLACEMENT`] so the name is always a single file stem
/// directly under the result root.
pub fn canonicalize(record: &ExperimentRecord) -> String {
    let mut out = String::new();
    for (idx, (_, value)) in record.fields().iter().enumerate() {
        if idx > 0 {
            out.push(VALUE_SEPARATOR);
        }
        let rendered = value.to_string();
        out.extend(
            rendered
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .map(|ch| if matches!(ch, '/' | '\\') { PATH_REPLACEMENT } else { ch }),
        );
    }
    out
}

/// Renders `field:value` pairs joined by `/` for operator traces.
pub fn flatten(record: &ExperimentRecord) -> String {
    record
        .fields()
        .iter()
        .map(|(name, value)| {
            let mut pair = format!("{name}:");
            push_compact(&mut pair, &value.to_string());
            pair
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn push_compact(out: &mut String, rendered: &str) {
    out.extend(rendered.chars().filter(|ch| !ch.is_whitespace()));
}
