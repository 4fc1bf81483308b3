//! Edition suffix stripping.
//!
//! Removes at most one trailing noise suffix ("remastered", "goty edition",
//! year tags, ...) from an already-normalized title.

use crate::tables::MatchTables;

/// Strip the first matching edition suffix from a normalized title.
///
/// Suffixes are tried in table order. The first one the title ends with at a
/// word boundary is removed and the remainder is trimmed; no second pass is
/// made, so compound suffixes lose only their last component. When nothing
/// matches, the input is returned unchanged.
///
/// The result always borrows from `normalized`.
///
/// # Arguments
///
/// * `normalized` - Output of [`normalize_title`](crate::normalize_title)
/// * `tables` - Supplies the ordered suffix list
///
/// # Examples
///
/// ```
/// use titlematch::{MatchTables, strip_edition_suffix};
///
/// let tables = MatchTables::default();
/// assert_eq!(strip_edition_suffix("dark souls remastered", &tables), "dark souls");
/// assert_eq!(strip_edition_suffix("dark souls", &tables), "dark souls");
/// ```
pub fn strip_edition_suffix<'t>(normalized: &'t str, tables: &MatchTables) -> &'t str {
    tables
        .suffixes
        .iter()
        .find_map(|suffix| suffix.strip_from(normalized))
        .unwrap_or(normalized)
}
