//! Cascading title matcher.
//!
//! This module implements the four-tier cascade that decides whether a query
//! title names a candidate already in a collection, from plain case-folded
//! equality down to edition-stripped, whitespace-free equality.

use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;

use crate::candidate::Titled;
use crate::normalize::{compact_title, lowercase_into, normalize_title};
use crate::options::MatchOptions;
use crate::suffix::strip_edition_suffix;
use crate::tables::{EditionSuffix, MatchTables, NumeralRule, TableError};

/// The tier at which a query matched a candidate.
///
/// Tiers are evaluated strictest first and the cascade stops at the first
/// tier with any hit:
///
/// | Tier              | Comparison                                          |
/// |-------------------|-----------------------------------------------------|
/// | `Exact`           | Equal after lowercasing alone                       |
/// | `Normalized`      | Equal normalized titles                             |
/// | `EditionStripped` | Equal after stripping one edition suffix (guarded)  |
/// | `Compact`         | Equal stripped titles with spaces removed (guarded) |
///
/// # Ordering
///
/// Stricter tiers compare as greater, so `Exact` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchTier {
    /// Equal after case folding only.
    Exact,
    /// Equal normalized titles.
    Normalized,
    /// Equal once one edition suffix is stripped from both sides.
    EditionStripped,
    /// Equal edition-stripped titles with all whitespace removed.
    Compact,
}

impl MatchTier {
    /// All tiers in cascade order.
    pub const ALL: [MatchTier; 4] = [
        MatchTier::Exact,
        MatchTier::Normalized,
        MatchTier::EditionStripped,
        MatchTier::Compact,
    ];

    fn strictness(self) -> u8 {
        match self {
            MatchTier::Exact => 4,
            MatchTier::Normalized => 3,
            MatchTier::EditionStripped => 2,
            MatchTier::Compact => 1,
        }
    }

    /// Short lowercase name, used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Normalized => "normalized",
            MatchTier::EditionStripped => "edition-stripped",
            MatchTier::Compact => "compact",
        }
    }
}

impl PartialOrd for MatchTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatchTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.strictness().cmp(&other.strictness())
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful match: the candidate, its position, and the deciding tier.
#[derive(Debug)]
pub struct TitleMatch<'a, T> {
    /// The matched candidate.
    pub item: &'a T,
    /// Position of the candidate in the searched collection.
    pub index: usize,
    /// The tier that produced the match.
    pub tier: MatchTier,
}

// Manual impls: `item` is a reference, so no `T: Clone` bound is needed.
impl<T> Clone for TitleMatch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TitleMatch<'_, T> {}

/// Normalized and edition-stripped forms of one title.
///
/// The stripped form is a prefix of the normalized form, stored as a byte
/// offset to avoid a second allocation.
#[derive(Debug, Clone)]
pub(crate) struct TitleKeys {
    normalized: String,
    stripped_end: usize,
}

impl TitleKeys {
    pub(crate) fn new(raw: &str, tables: &MatchTables, options: &MatchOptions) -> Self {
        let normalized = normalize_title(raw, tables, options);
        let stripped_end = strip_edition_suffix(&normalized, tables).len();
        Self {
            normalized,
            stripped_end,
        }
    }

    pub(crate) fn normalized(&self) -> &str {
        &self.normalized
    }

    pub(crate) fn stripped(&self) -> &str {
        &self.normalized[..self.stripped_end]
    }

    pub(crate) fn compact(&self) -> Cow<'_, str> {
        compact_title(self.stripped())
    }
}

/// Pre-computed query data shared by every candidate comparison.
pub(crate) struct PreparedQuery {
    /// Lowercased raw query (exact tier).
    pub(crate) lower: String,
    pub(crate) keys: TitleKeys,
    compact: String,
    /// Whether the stripped query clears `min_stripped_len`.
    stripped_ok: bool,
    /// Whether the compact query clears `min_compact_len`.
    compact_ok: bool,
}

impl PreparedQuery {
    pub(crate) fn new(query: &str, tables: &MatchTables, options: &MatchOptions) -> Self {
        let mut lower = String::new();
        lowercase_into(query, &mut lower);
        let keys = TitleKeys::new(query, tables, options);
        let compact = keys.compact().into_owned();
        let stripped_ok = keys.stripped().chars().count() > options.min_stripped_len;
        let compact_ok = compact.chars().count() > options.min_compact_len;
        Self {
            lower,
            keys,
            compact,
            stripped_ok,
            compact_ok,
        }
    }
}

/// Run the edition-stripped and compact tiers over pre-computed candidate
/// keys, returning the first hit of the first tier that has one.
pub(crate) fn scan_loose_tiers<'k, I>(pq: &PreparedQuery, mut keys: I) -> Option<(usize, MatchTier)>
where
    I: Iterator<Item = &'k TitleKeys> + Clone,
{
    if pq.stripped_ok {
        let stripped = pq.keys.stripped();
        if let Some(index) = keys.clone().position(|k| k.stripped() == stripped) {
            return Some((index, MatchTier::EditionStripped));
        }
    }
    log::trace!("no {} hit for {:?}", MatchTier::EditionStripped, pq.keys.normalized());

    if pq.compact_ok {
        if let Some(index) = keys.position(|k| k.compact() == pq.compact) {
            return Some((index, MatchTier::Compact));
        }
    }
    log::trace!("no {} hit for {:?}", MatchTier::Compact, pq.keys.normalized());

    None
}

/// Whether a query should be rejected before any work is done.
pub(crate) fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// TOML document accepted by [`TitleMatcher::from_toml_str`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MatcherConfig {
    suffixes: Option<Vec<EditionSuffix>>,
    numerals: Option<Vec<NumeralRule>>,
    options: MatchOptions,
}

/// Resolves query titles against candidate collections.
///
/// The matcher owns its immutable tables and options and holds no other
/// state; every call scans the given collection afresh. It is `Send + Sync`
/// and can be shared across threads by reference.
///
/// # Examples
///
/// ```
/// use titlematch::{MatchTier, TitleMatcher};
///
/// let matcher = TitleMatcher::default();
/// let library = ["Mass Effect 2", "The Witcher 3: Wild Hunt"];
///
/// let hit = matcher.find_match("Mass Effect II", &library).unwrap();
/// assert_eq!(hit.index, 0);
/// assert_eq!(hit.tier, MatchTier::Normalized);
///
/// assert!(matcher.find_match("Halo Infinite", &library).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TitleMatcher {
    tables: MatchTables,
    options: MatchOptions,
}

impl TitleMatcher {
    /// Create a matcher from injected tables and options.
    pub fn new(tables: MatchTables, options: MatchOptions) -> Self {
        Self { tables, options }
    }

    /// Build a matcher from a TOML document.
    ///
    /// Recognized keys are `suffixes`, `numerals` (array of tables with
    /// `token` and `value`) and an `[options]` table mirroring
    /// [`MatchOptions`]. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`TableError::Parse`] for malformed TOML or unknown keys, and any
    /// error from [`MatchTables::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use titlematch::TitleMatcher;
    ///
    /// let matcher = TitleMatcher::from_toml_str(
    ///     r#"
    ///     suffixes = ["redux"]
    ///
    ///     [options]
    ///     min_compact_len = 7
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(matcher.options().min_compact_len, 7);
    /// assert_eq!(matcher.tables().suffixes.len(), 1);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        let config: MatcherConfig = toml::from_str(text)?;
        let defaults = MatchTables::default();
        let tables = MatchTables {
            suffixes: config.suffixes.unwrap_or(defaults.suffixes),
            numerals: config.numerals.unwrap_or(defaults.numerals),
        };
        tables.validate()?;
        log::debug!(
            "matcher configured with {} suffixes, {} numerals, {:?}",
            tables.suffixes.len(),
            tables.numerals.len(),
            config.options
        );
        Ok(Self::new(tables, config.options))
    }

    /// The injected tables.
    pub fn tables(&self) -> &MatchTables {
        &self.tables
    }

    /// The injected options.
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Normalize a raw title with this matcher's tables and options.
    pub fn normalize(&self, raw: &str) -> String {
        normalize_title(raw, &self.tables, &self.options)
    }

    /// Strip one edition suffix from a normalized title.
    pub fn strip_suffix<'t>(&self, normalized: &'t str) -> &'t str {
        strip_edition_suffix(normalized, &self.tables)
    }

    pub(crate) fn prepare(&self, query: &str) -> PreparedQuery {
        PreparedQuery::new(query, &self.tables, &self.options)
    }

    pub(crate) fn keys(&self, raw: &str) -> TitleKeys {
        TitleKeys::new(raw, &self.tables, &self.options)
    }

    /// Find the candidate a query title refers to.
    ///
    /// Tiers run strictest first; the first tier with any hit decides, and
    /// within it the earliest candidate in `candidates` wins. Returns `None`
    /// without normalizing anything when the query is blank or `candidates`
    /// is empty.
    ///
    /// # Arguments
    ///
    /// * `query` - The incoming raw title
    /// * `candidates` - The collection to search, in priority order
    ///
    /// # Returns
    ///
    /// The matched candidate with its index and tier, or `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use titlematch::{MatchTier, TitleMatcher};
    ///
    /// let matcher = TitleMatcher::default();
    /// let wishlist = vec!["Dark Souls".to_owned()];
    ///
    /// let hit = matcher.find_match("Dark Souls: Remastered", &wishlist).unwrap();
    /// assert_eq!(hit.tier, MatchTier::EditionStripped);
    /// assert_eq!(hit.item, "Dark Souls");
    /// ```
    pub fn find_match<'a, T: Titled>(
        &self,
        query: &str,
        candidates: &'a [T],
    ) -> Option<TitleMatch<'a, T>> {
        if is_blank(query) || candidates.is_empty() {
            return None;
        }

        let pq = self.prepare(query);
        let hit = move |index: usize, tier: MatchTier| {
            log::debug!(
                "{query:?} matched {:?} at index {index} ({tier})",
                candidates[index].title()
            );
            TitleMatch {
                item: &candidates[index],
                index,
                tier,
            }
        };

        let mut buf = String::new();
        let exact = candidates.iter().position(|candidate| {
            lowercase_into(candidate.title(), &mut buf);
            buf == pq.lower
        });
        if let Some(index) = exact {
            return Some(hit(index, MatchTier::Exact));
        }
        log::trace!("no {} hit for {query:?}", MatchTier::Exact);

        // Nothing but separators and glyphs. Tier 2 taken literally would pair
        // this with any candidate that also normalizes to "", so such queries
        // deliberately stop after the exact tier.
        if pq.keys.normalized().is_empty() {
            return None;
        }

        let keys: Vec<TitleKeys> = candidates.iter().map(|c| self.keys(c.title())).collect();

        let normalized = pq.keys.normalized();
        if let Some(index) = keys.iter().position(|k| k.normalized() == normalized) {
            return Some(hit(index, MatchTier::Normalized));
        }
        log::trace!("no {} hit for {query:?}", MatchTier::Normalized);

        scan_loose_tiers(&pq, keys.iter()).map(|(index, tier)| hit(index, tier))
    }

    /// Whether `query` matches any candidate.
    pub fn is_match<T: Titled>(&self, query: &str, candidates: &[T]) -> bool {
        self.find_match(query, candidates).is_some()
    }

    /// Classify how two titles match, if at all.
    ///
    /// Equivalent to [`find_match`](Self::find_match) over a one-element
    /// collection holding `candidate`.
    ///
    /// # Examples
    ///
    /// ```
    /// use titlematch::{MatchTier, TitleMatcher};
    ///
    /// let matcher = TitleMatcher::default();
    /// assert_eq!(matcher.match_tier("DOOM", "doom"), Some(MatchTier::Exact));
    /// assert_eq!(matcher.match_tier("Doom", "Quake"), None);
    /// ```
    pub fn match_tier(&self, query: &str, candidate: &str) -> Option<MatchTier> {
        self.find_match(query, &[candidate]).map(|m| m.tier)
    }
}
