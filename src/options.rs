//! Configuration options for the title matcher.
//!
//! [`MatchOptions`] controls the behavior that is not table data: optional
//! diacritics folding and the minimum-length guards of the two loosest tiers.

use serde::Deserialize;

/// Global options that control normalization and tier acceptance.
///
/// # Defaults
///
/// - `fold_diacritics`: `false` (accented letters are compared as written)
/// - `min_stripped_len`: `3` (tier 3 needs a stripped query of 4+ characters)
/// - `min_compact_len`: `5` (tier 4 needs a compacted query of 6+ characters)
///
/// # Examples
///
/// ```
/// use titlematch::MatchOptions;
///
/// let opts = MatchOptions::default();
/// assert!(!opts.fold_diacritics);
/// assert_eq!(opts.min_stripped_len, 3);
///
/// // Fold "Pokémon" and "Pokemon" together
/// let opts = MatchOptions { fold_diacritics: true, ..Default::default() };
/// assert!(opts.fold_diacritics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchOptions {
    /// When `true`, diacritics are stripped before normalization so that
    /// e.g. "pokemon" matches "pok\u{00e9}mon". Off by default.
    pub fold_diacritics: bool,

    /// Tier 3 (edition-stripped) only accepts a hit when the stripped query
    /// has strictly more characters than this.
    pub min_stripped_len: usize,

    /// Tier 4 (compact) only accepts a hit when the whitespace-free query
    /// has strictly more characters than this.
    pub min_compact_len: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fold_diacritics: false,
            min_stripped_len: 3,
            min_compact_len: 5,
        }
    }
}
