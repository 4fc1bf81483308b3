#![warn(missing_docs)]

//! Game title resolution.
//!
//! `titlematch` decides whether an incoming game title names a record that is
//! already in a library, wishlist or catalog. Titles are compared through a
//! four-tier cascade (exact, normalized, edition-stripped, compact) that stops
//! at the first tier with a hit and returns the earliest matching candidate.
//! Matching is purely syntactic and never performs I/O.

/// Title normalization: case folding, punctuation and glyph removal, numerals.
pub mod normalize;

/// Removal of one trailing edition suffix.
pub mod suffix;

/// The cascading matcher and its tiers.
pub mod matcher;

/// Per-batch hash index over a candidate collection.
pub mod index;

/// The "exposes a title" capability.
pub mod candidate;

/// Closure-based title extraction for arbitrary records.
pub mod key;

/// Library/wishlist cross-referencing and platform-import reconciliation.
pub mod reconcile;

/// Suffix and numeral tables.
pub mod tables;

/// Configuration options for normalization and tier guards.
pub mod options;

// Re-export primary public API types and functions at the crate root.
pub use candidate::Titled;
pub use index::TitleIndex;
pub use key::{KeyedRecord, TitleKey};
pub use matcher::{MatchTier, TitleMatch, TitleMatcher};
pub use normalize::normalize_title;
pub use options::MatchOptions;
pub use reconcile::{
    ImportAction, Ownership, ReconcileStats, Reconciliation, cross_reference, reconcile_imports,
};
pub use suffix::strip_edition_suffix;
pub use tables::{EditionSuffix, MatchTables, NumeralRule, TableError};
