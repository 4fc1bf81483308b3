//! Title extraction for records that do not implement [`Titled`] themselves.
//!
//! A [`TitleKey<T>`] wraps a closure that borrows the title field of a `T`.
//! [`TitleKey::wrap`] turns a slice of records into [`KeyedRecord`]s, which
//! implement [`Titled`] and can be passed to the matcher, the index, or the
//! reconciliation routines while keeping a reference to the original record.

use std::fmt;

use crate::candidate::Titled;

/// Type alias for the boxed extractor closure stored inside a [`TitleKey`].
type Extractor<T> = Box<dyn Fn(&T) -> &str + Send + Sync>;

/// Describes where the title of a `T` lives.
///
/// # Examples
///
/// ```
/// use titlematch::{TitleKey, TitleMatcher};
///
/// struct CatalogEntry { sku: u32, display_name: String }
///
/// let catalog = vec![
///     CatalogEntry { sku: 1, display_name: "Celeste".to_owned() },
///     CatalogEntry { sku: 2, display_name: "Hollow Knight".to_owned() },
/// ];
///
/// let key = TitleKey::from_fn(|e: &CatalogEntry| e.display_name.as_str());
/// let keyed = key.wrap(&catalog);
///
/// let matcher = TitleMatcher::default();
/// let hit = matcher.find_match("HOLLOW KNIGHT", &keyed).unwrap();
/// assert_eq!(hit.item.record.sku, 2);
/// ```
pub struct TitleKey<T> {
    extractor: Extractor<T>,
}

impl<T> TitleKey<T> {
    /// Create a key from a closure that borrows the title from a record.
    ///
    /// # Arguments
    ///
    /// * `f` - Given a record, returns its raw title
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        Self {
            extractor: Box::new(f),
        }
    }

    /// Extract the title of `record`.
    pub fn extract<'r>(&self, record: &'r T) -> &'r str {
        (self.extractor)(record)
    }

    /// Pair every record with this key, preserving order.
    ///
    /// The returned records are indexed exactly like `records`, so a match
    /// index maps straight back to the source collection.
    pub fn wrap<'a>(&'a self, records: &'a [T]) -> Vec<KeyedRecord<'a, T>> {
        records
            .iter()
            .map(|record| KeyedRecord { record, key: self })
            .collect()
    }
}

impl<T> fmt::Debug for TitleKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleKey").finish_non_exhaustive()
    }
}

/// A record paired with the [`TitleKey`] that reads its title.
pub struct KeyedRecord<'a, T> {
    /// The wrapped record.
    pub record: &'a T,
    key: &'a TitleKey<T>,
}

impl<T> Titled for KeyedRecord<'_, T> {
    fn title(&self) -> &str {
        self.key.extract(self.record)
    }
}

// Manual impls: deriving would require `T: Clone` / `T: Debug` on the key.
impl<T> Clone for KeyedRecord<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for KeyedRecord<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for KeyedRecord<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedRecord")
            .field("record", self.record)
            .finish()
    }
}
