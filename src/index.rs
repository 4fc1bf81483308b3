//! Per-batch hash index over a candidate collection.
//!
//! [`TitleIndex`] pays the normalization cost once per candidate so that the
//! exact and normalized tiers become hash lookups. The edition-stripped and
//! compact tiers still scan linearly, but over pre-computed keys. Results are
//! identical to [`TitleMatcher::find_match`] on the same collection.

use std::collections::HashMap;

use crate::candidate::Titled;
use crate::matcher::{MatchTier, TitleKeys, TitleMatch, TitleMatcher, is_blank, scan_loose_tiers};
use crate::normalize::lowercase_into;

/// A read-only index over a snapshot of candidates.
///
/// Build one per batch; the borrowed collection cannot change while the index
/// is alive. The index is `Sync` whenever `T` is, so one index can serve a
/// whole worker pool.
///
/// # Examples
///
/// ```
/// use titlematch::{MatchTier, TitleIndex, TitleMatcher};
///
/// let matcher = TitleMatcher::default();
/// let library = vec!["Mass Effect 2".to_owned(), "Dark Souls".to_owned()];
/// let index = TitleIndex::build(&matcher, &library);
///
/// let hit = index.find("Mass Effect II").unwrap();
/// assert_eq!(hit.index, 0);
/// assert_eq!(hit.tier, MatchTier::Normalized);
///
/// let hit = index.find("Dark Souls: Remastered").unwrap();
/// assert_eq!(hit.tier, MatchTier::EditionStripped);
/// ```
#[derive(Debug)]
pub struct TitleIndex<'a, T> {
    matcher: &'a TitleMatcher,
    candidates: &'a [T],
    /// Lowercased title to first candidate index.
    exact: HashMap<String, usize>,
    /// Normalized title to first candidate index.
    normalized: HashMap<String, usize>,
    /// Per-candidate keys for the linear tiers, in collection order.
    keys: Vec<TitleKeys>,
}

impl<'a, T: Titled> TitleIndex<'a, T> {
    /// Normalize every candidate once and index the results.
    ///
    /// When several candidates share a key, the first one in collection
    /// order is kept, which preserves first-hit-wins.
    pub fn build(matcher: &'a TitleMatcher, candidates: &'a [T]) -> Self {
        let mut exact = HashMap::with_capacity(candidates.len());
        let mut normalized = HashMap::with_capacity(candidates.len());
        let mut keys = Vec::with_capacity(candidates.len());
        let mut buf = String::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let title = candidate.title();
            lowercase_into(title, &mut buf);
            if !exact.contains_key(buf.as_str()) {
                exact.insert(buf.clone(), index);
            }

            let candidate_keys = matcher.keys(title);
            normalized
                .entry(candidate_keys.normalized().to_owned())
                .or_insert(index);
            keys.push(candidate_keys);
        }

        log::debug!(
            "indexed {} candidates ({} distinct normalized titles)",
            candidates.len(),
            normalized.len()
        );

        Self {
            matcher,
            candidates,
            exact,
            normalized,
            keys,
        }
    }

    /// Find the candidate a query title refers to.
    ///
    /// Same contract as [`TitleMatcher::find_match`].
    pub fn find(&self, query: &str) -> Option<TitleMatch<'a, T>> {
        if is_blank(query) || self.candidates.is_empty() {
            return None;
        }

        let pq = self.matcher.prepare(query);
        let candidates = self.candidates;
        let hit = move |index: usize, tier: MatchTier| TitleMatch {
            item: &candidates[index],
            index,
            tier,
        };

        if let Some(&index) = self.exact.get(pq.lower.as_str()) {
            return Some(hit(index, MatchTier::Exact));
        }
        // Same deliberate cutoff as the linear matcher: an empty normalized
        // query never reaches the normalized tier.
        if pq.keys.normalized().is_empty() {
            return None;
        }
        if let Some(&index) = self.normalized.get(pq.keys.normalized()) {
            return Some(hit(index, MatchTier::Normalized));
        }

        scan_loose_tiers(&pq, self.keys.iter()).map(|(index, tier)| hit(index, tier))
    }

    /// The indexed collection.
    pub fn candidates(&self) -> &'a [T] {
        self.candidates
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the index holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
