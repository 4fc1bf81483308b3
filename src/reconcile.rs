//! Resolution call sites: ownership flags and platform-import reconciliation.
//!
//! Both routines snapshot their candidate collections by borrowing them for
//! the duration of the call, build a [`TitleIndex`] once, and resolve every
//! entry independently on the rayon thread pool. Results come back in input
//! order.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::candidate::Titled;
use crate::index::TitleIndex;
use crate::matcher::{MatchTier, TitleMatcher};

/// Library and wishlist hits for one catalog or wishlist entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    /// Index of the matching library record, if any.
    pub owned: Option<usize>,
    /// Index of the matching wishlist record, if any.
    pub wishlisted: Option<usize>,
}

impl Ownership {
    /// Whether the entry is already in the library.
    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Whether the entry is already wishlisted.
    pub fn is_wishlisted(&self) -> bool {
        self.wishlisted.is_some()
    }

    /// Whether an "add" affordance should be offered for the entry.
    pub fn can_add(&self) -> bool {
        !self.is_owned() && !self.is_wishlisted()
    }
}

/// Flag each entry as already owned and/or already wishlisted.
///
/// # Arguments
///
/// * `matcher` - Supplies tables and options
/// * `entries` - Catalog or wishlist entries to flag
/// * `library` - The user's library
/// * `wishlist` - The user's wishlist
///
/// # Returns
///
/// One [`Ownership`] per entry, in entry order.
///
/// # Examples
///
/// ```
/// use titlematch::{TitleMatcher, cross_reference};
///
/// let matcher = TitleMatcher::default();
/// let catalog = ["Mass Effect II", "Hades", "Celeste"];
/// let library = ["Mass Effect 2"];
/// let wishlist = ["HADES"];
///
/// let flags = cross_reference(&matcher, &catalog, &library, &wishlist);
/// assert!(flags[0].is_owned());
/// assert!(flags[1].is_wishlisted());
/// assert!(flags[2].can_add());
/// ```
pub fn cross_reference<E, L, W>(
    matcher: &TitleMatcher,
    entries: &[E],
    library: &[L],
    wishlist: &[W],
) -> Vec<Ownership>
where
    E: Titled + Sync,
    L: Titled + Sync,
    W: Titled + Sync,
{
    let library_index = TitleIndex::build(matcher, library);
    let wishlist_index = TitleIndex::build(matcher, wishlist);

    entries
        .par_iter()
        .map(|entry| {
            let title = entry.title();
            Ownership {
                owned: library_index.find(title).map(|m| m.index),
                wishlisted: wishlist_index.find(title).map(|m| m.index),
            }
        })
        .collect()
}

/// What to do with one imported platform record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    /// Merge into the existing library record at `library_index`.
    Update {
        /// Index into the library snapshot.
        library_index: usize,
        /// Tier that decided the match.
        tier: MatchTier,
    },
    /// No library record matched; add a new one.
    Insert,
}

/// Counters for one reconciliation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Imported records examined.
    pub imported: usize,
    /// Records routed to an update.
    pub updated: usize,
    /// Records routed to an insert.
    pub inserted: usize,
    /// Library records targeted by more than one import.
    pub contested: usize,
    /// Inserts that match an earlier insert of the same batch.
    pub duplicate_inserts: usize,
    by_tier: [usize; 4],
}

impl ReconcileStats {
    /// Number of updates decided at `tier`.
    pub fn tier_count(&self, tier: MatchTier) -> usize {
        self.by_tier[tier_slot(tier)]
    }
}

fn tier_slot(tier: MatchTier) -> usize {
    match tier {
        MatchTier::Exact => 0,
        MatchTier::Normalized => 1,
        MatchTier::EditionStripped => 2,
        MatchTier::Compact => 3,
    }
}

/// Result of [`reconcile_imports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// One action per imported record, in import order.
    pub actions: Vec<ImportAction>,
    /// Batch counters.
    pub stats: ReconcileStats,
}

impl Reconciliation {
    /// `(import_index, library_index, tier)` for every update.
    pub fn updates(&self) -> impl Iterator<Item = (usize, usize, MatchTier)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .filter_map(|(i, action)| match *action {
                ImportAction::Update {
                    library_index,
                    tier,
                } => Some((i, library_index, tier)),
                ImportAction::Insert => None,
            })
    }

    /// Import indices routed to an insert.
    pub fn inserts(&self) -> impl Iterator<Item = usize> + '_ {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, action)| matches!(action, ImportAction::Insert))
            .map(|(i, _)| i)
    }

    /// Apply the decided actions to the library the batch was resolved
    /// against.
    ///
    /// Updates run first, in import order, through `merge`; inserts are then
    /// appended in import order through `create`. Appending never moves
    /// existing records, so update indices stay valid.
    ///
    /// Actions whose import or library index is out of range for the slices
    /// passed in are skipped with a warning.
    ///
    /// # Arguments
    ///
    /// * `imports` - The same imported records passed to [`reconcile_imports`]
    /// * `library` - The library the batch was resolved against, unchanged since
    /// * `merge` - Folds an import into an existing record (e.g. add play time)
    /// * `create` - Builds a new library record from an import
    pub fn apply<I, L, M, C>(&self, imports: &[I], library: &mut Vec<L>, mut merge: M, mut create: C)
    where
        M: FnMut(&mut L, &I),
        C: FnMut(&I) -> L,
    {
        debug_assert_eq!(imports.len(), self.actions.len());
        for (import_index, library_index, _) in self.updates() {
            match (imports.get(import_index), library.get_mut(library_index)) {
                (Some(import), Some(existing)) => merge(existing, import),
                _ => log::warn!(
                    "skipping update of library record {library_index} from import {import_index}: out of range"
                ),
            }
        }
        for import_index in self.inserts() {
            match imports.get(import_index) {
                Some(import) => library.push(create(import)),
                None => log::warn!("skipping insert of import {import_index}: out of range"),
            }
        }
    }
}

/// Route each imported record to an update of an existing library record or
/// to an insert.
///
/// The library is indexed once and each import is resolved independently on
/// the rayon pool. Several imports may resolve to the same library record;
/// they are all routed to updates and counted as contested.
///
/// Imports that match each other but nothing in the library are each routed
/// to an insert, so [`Reconciliation::apply`] would append one record per
/// import. They are counted in [`ReconcileStats::duplicate_inserts`] and
/// logged; callers that want one record per game should merge them first.
///
/// # Examples
///
/// ```
/// use titlematch::{ImportAction, MatchTier, TitleMatcher, reconcile_imports};
///
/// let matcher = TitleMatcher::default();
/// let library = ["The Witcher 3: Wild Hunt"];
/// let imports = ["the witcher 3 wild hunt", "Hades"];
///
/// let result = reconcile_imports(&matcher, &imports, &library);
/// assert_eq!(
///     result.actions,
///     vec![
///         ImportAction::Update { library_index: 0, tier: MatchTier::Normalized },
///         ImportAction::Insert,
///     ]
/// );
/// assert_eq!(result.stats.updated, 1);
/// assert_eq!(result.stats.inserted, 1);
/// ```
pub fn reconcile_imports<I, L>(matcher: &TitleMatcher, imports: &[I], library: &[L]) -> Reconciliation
where
    I: Titled + Sync,
    L: Titled + Sync,
{
    let index = TitleIndex::build(matcher, library);

    let actions: Vec<ImportAction> = imports
        .par_iter()
        .map(|import| match index.find(import.title()) {
            Some(hit) => ImportAction::Update {
                library_index: hit.index,
                tier: hit.tier,
            },
            None => ImportAction::Insert,
        })
        .collect();

    let mut stats = ReconcileStats {
        imported: imports.len(),
        ..Default::default()
    };
    let mut targets: HashMap<usize, usize> = HashMap::new();
    for action in &actions {
        match *action {
            ImportAction::Update {
                library_index,
                tier,
            } => {
                stats.updated += 1;
                stats.by_tier[tier_slot(tier)] += 1;
                *targets.entry(library_index).or_default() += 1;
            }
            ImportAction::Insert => stats.inserted += 1,
        }
    }

    for (&library_index, &count) in &targets {
        if count > 1 {
            stats.contested += 1;
            log::warn!(
                "{count} imports resolved to library record {library_index} ({:?})",
                library[library_index].title()
            );
        }
    }

    let inserted: Vec<&I> = actions
        .iter()
        .zip(imports)
        .filter(|(action, _)| matches!(action, ImportAction::Insert))
        .map(|(_, import)| import)
        .collect();
    let pending = TitleIndex::build(matcher, &inserted);
    for (position, import) in inserted.iter().enumerate() {
        if let Some(hit) = pending.find(import.title()) {
            if hit.index != position {
                stats.duplicate_inserts += 1;
                log::warn!(
                    "insert {:?} matches earlier insert {:?} ({})",
                    import.title(),
                    hit.item.title(),
                    hit.tier
                );
            }
        }
    }

    log::info!(
        "reconciled {} imports: {} updates ({} exact, {} normalized, {} edition-stripped, {} compact), {} inserts",
        stats.imported,
        stats.updated,
        stats.tier_count(MatchTier::Exact),
        stats.tier_count(MatchTier::Normalized),
        stats.tier_count(MatchTier::EditionStripped),
        stats.tier_count(MatchTier::Compact),
        stats.inserted
    );

    Reconciliation { actions, stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct LibraryGame {
        name: String,
        minutes_played: u32,
    }

    impl Titled for LibraryGame {
        fn title(&self) -> &str {
            &self.name
        }
    }

    struct PlatformGame {
        title: &'static str,
        minutes_played: u32,
    }

    impl Titled for PlatformGame {
        fn title(&self) -> &str {
            self.title
        }
    }

    fn game(name: &str, minutes_played: u32) -> LibraryGame {
        LibraryGame {
            name: name.to_owned(),
            minutes_played,
        }
    }

    // --- cross_reference ---

    #[test]
    fn flags_owned_and_wishlisted() {
        let matcher = TitleMatcher::default();
        let catalog = ["Mass Effect II", "Dark Souls: Remastered", "Celeste", "Hades"];
        let library = [game("Mass Effect 2", 0), game("Hades", 30)];
        let wishlist = ["Dark Souls", "hades"];

        let flags = cross_reference(&matcher, &catalog, &library, &wishlist);
        assert_eq!(
            flags,
            vec![
                Ownership {
                    owned: Some(0),
                    wishlisted: None
                },
                Ownership {
                    owned: None,
                    wishlisted: Some(0)
                },
                Ownership::default(),
                Ownership {
                    owned: Some(1),
                    wishlisted: Some(1)
                },
            ]
        );
        assert!(flags[2].can_add());
        assert!(!flags[3].can_add());
    }

    #[test]
    fn cross_reference_empty_inputs() {
        let matcher = TitleMatcher::default();
        let none: [&str; 0] = [];
        assert!(cross_reference(&matcher, &none, &["Doom"], &none).is_empty());
        let flags = cross_reference(&matcher, &["Doom"], &none, &none);
        assert_eq!(flags, vec![Ownership::default()]);
    }

    // --- reconcile_imports ---

    #[test]
    fn routes_updates_and_inserts() {
        let matcher = TitleMatcher::default();
        let library = [game("The Witcher 3: Wild Hunt", 600), game("Mass Effect 2", 0)];
        let imports = ["THE WITCHER 3: WILD HUNT", "Mass Effect II", "Hades"];

        let result = reconcile_imports(&matcher, &imports, &library);
        assert_eq!(
            result.actions,
            vec![
                ImportAction::Update {
                    library_index: 0,
                    tier: MatchTier::Exact
                },
                ImportAction::Update {
                    library_index: 1,
                    tier: MatchTier::Normalized
                },
                ImportAction::Insert,
            ]
        );
        assert_eq!(result.stats.imported, 3);
        assert_eq!(result.stats.updated, 2);
        assert_eq!(result.stats.inserted, 1);
        assert_eq!(result.stats.contested, 0);
        assert_eq!(result.stats.tier_count(MatchTier::Exact), 1);
        assert_eq!(result.stats.tier_count(MatchTier::Normalized), 1);
        assert_eq!(result.stats.tier_count(MatchTier::Compact), 0);
    }

    #[test]
    fn contested_targets_counted() {
        let matcher = TitleMatcher::default();
        let library = ["Dark Souls"];
        let imports = ["DARK SOULS", "Dark Souls: Remastered", "Dark Souls (2011)"];

        let result = reconcile_imports(&matcher, &imports, &library);
        assert_eq!(result.stats.updated, 3);
        assert_eq!(result.stats.contested, 1);
        assert_eq!(result.stats.tier_count(MatchTier::EditionStripped), 2);
    }

    #[test]
    fn duplicate_inserts_counted() {
        let matcher = TitleMatcher::default();
        let library = ["Celeste"];
        let imports = ["Hades", "Celeste", "HADES", "Hades (2020)", "Doom"];

        let result = reconcile_imports(&matcher, &imports, &library);
        assert_eq!(result.stats.inserted, 4);
        assert_eq!(result.stats.duplicate_inserts, 2);
        assert_eq!(result.stats.contested, 0);
    }

    #[test]
    fn apply_skips_out_of_range_updates() {
        let matcher = TitleMatcher::default();
        let imports = [PlatformGame {
            title: "Mass Effect II",
            minutes_played: 20,
        }];
        let resolved_against = vec![game("Celeste", 5), game("Mass Effect 2", 100)];
        let result = reconcile_imports(&matcher, &imports, &resolved_against);

        let mut other = vec![game("Celeste", 5)];
        result.apply(
            &imports,
            &mut other,
            |existing, import| existing.minutes_played += import.minutes_played,
            |import| game(import.title, import.minutes_played),
        );
        assert_eq!(other, vec![game("Celeste", 5)]);
    }

    #[test]
    fn empty_library_inserts_everything() {
        let matcher = TitleMatcher::default();
        let library: [&str; 0] = [];
        let result = reconcile_imports(&matcher, &["Doom", "Quake"], &library);
        assert_eq!(result.actions, vec![ImportAction::Insert, ImportAction::Insert]);
        assert_eq!(result.inserts().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(result.updates().count(), 0);
    }

    #[test]
    fn apply_merges_and_appends() {
        let matcher = TitleMatcher::default();
        let mut library = vec![game("Mass Effect 2", 100)];
        let imports = [
            PlatformGame {
                title: "Mass Effect II",
                minutes_played: 20,
            },
            PlatformGame {
                title: "Hades",
                minutes_played: 45,
            },
        ];

        let result = reconcile_imports(&matcher, &imports, &library);
        result.apply(
            &imports,
            &mut library,
            |existing, import| existing.minutes_played += import.minutes_played,
            |import| game(import.title, import.minutes_played),
        );

        assert_eq!(library, vec![game("Mass Effect 2", 120), game("Hades", 45)]);
    }

    #[test]
    fn reimport_is_all_updates() {
        let matcher = TitleMatcher::default();
        let mut library = vec![game("Celeste", 10)];
        let imports = [
            PlatformGame {
                title: "Celeste",
                minutes_played: 5,
            },
            PlatformGame {
                title: "Tunic",
                minutes_played: 5,
            },
        ];

        let first = reconcile_imports(&matcher, &imports, &library);
        first.apply(&imports, &mut library, |_, _| {}, |i| game(i.title, i.minutes_played));
        assert_eq!(library.len(), 2);

        let second = reconcile_imports(&matcher, &imports, &library);
        assert_eq!(second.stats.inserted, 0);
        assert_eq!(second.stats.updated, 2);
    }

    #[test]
    fn order_matches_input_on_large_batch() {
        let matcher = TitleMatcher::default();
        let library: Vec<String> = (0..200).map(|i| format!("Game {i}")).collect();
        let imports: Vec<String> = (0..400).map(|i| format!("GAME {i}")).collect();

        let result = reconcile_imports(&matcher, &imports, &library);
        for (i, action) in result.actions.iter().enumerate() {
            if i < 200 {
                assert_eq!(
                    *action,
                    ImportAction::Update {
                        library_index: i,
                        tier: MatchTier::Exact
                    }
                );
            } else {
                assert_eq!(*action, ImportAction::Insert);
            }
        }
    }
}
