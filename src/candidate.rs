//! The "exposes a title" capability.
//!
//! The matcher never looks at anything but a candidate's title, so library
//! games, wishlist items and catalog entries only need to implement
//! [`Titled`] (or be wrapped with a [`TitleKey`](crate::key::TitleKey)) to be
//! searched interchangeably.

use std::borrow::Cow;

/// Trait for records that can be matched by title.
///
/// # Built-in Implementations
///
/// - [`String`], [`str`], [`Cow<'_, str>`] -- the string is the title
/// - `&T` and `Box<T>` for any `T: Titled`
///
/// # Examples
///
/// ```
/// use titlematch::Titled;
///
/// struct WishlistItem { name: String, priority: u8 }
///
/// impl Titled for WishlistItem {
///     fn title(&self) -> &str {
///         &self.name
///     }
/// }
///
/// let item = WishlistItem { name: "Hades".to_owned(), priority: 1 };
/// assert_eq!(item.title(), "Hades");
/// assert_eq!("Celeste".title(), "Celeste");
/// ```
pub trait Titled {
    /// Returns the raw title of this record.
    fn title(&self) -> &str;
}

impl Titled for String {
    fn title(&self) -> &str {
        self.as_str()
    }
}

impl Titled for str {
    fn title(&self) -> &str {
        self
    }
}

impl Titled for Cow<'_, str> {
    fn title(&self) -> &str {
        self.as_ref()
    }
}

// Covers `&str` as well as references to records, so a `Vec<&Game>` can be
// searched without copying.
impl<T: Titled + ?Sized> Titled for &T {
    fn title(&self) -> &str {
        (**self).title()
    }
}

impl<T: Titled + ?Sized> Titled for Box<T> {
    fn title(&self) -> &str {
        (**self).title()
    }
}
