//! Suffix and numeral tables injected into the matcher.
//!
//! The curated edition-suffix list and the roman-numeral table are plain data.
//! [`MatchTables::default`] provides the built-in set; alternate tables can be
//! constructed directly or loaded from TOML text with
//! [`MatchTables::from_toml_str`]. Loading never touches the filesystem; the
//! caller supplies the document contents.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::normalize_title;
use crate::options::MatchOptions;

/// Errors raised while loading or validating a table set.
#[derive(Debug, Error)]
pub enum TableError {
    /// The TOML document could not be parsed into tables.
    #[error("invalid table document: {0}")]
    Parse(#[from] toml::de::Error),

    /// A suffix, numeral token, or numeral value was empty.
    #[error("empty {kind} entry")]
    EmptyEntry {
        /// Which table the empty entry came from.
        kind: &'static str,
    },

    /// A suffix or numeral value is not written in normalized form.
    #[error("entry {entry:?} is not normalized (normalizes to {normalized:?})")]
    NotNormalized {
        /// The entry as written.
        entry: String,
        /// What the entry normalizes to.
        normalized: String,
    },

    /// The same suffix or numeral token appears twice.
    #[error("duplicate entry {entry:?}")]
    Duplicate {
        /// The repeated entry.
        entry: String,
    },

    /// A numeral token must be a single lowercase whitespace-free token.
    #[error("numeral token {token:?} must be a single lowercase token")]
    MultiTokenNumeral {
        /// The offending token.
        token: String,
    },

    /// A numeral replacement is itself a numeral token, which would make
    /// normalization non-idempotent.
    #[error("numeral value {value:?} is also a numeral token")]
    ChainedNumeral {
        /// The offending replacement value.
        value: String,
    },
}

/// One trailing noise suffix, written in normalized form.
///
/// A `#` inside the pattern matches any single ASCII digit, which lets year
/// tags such as `(####)` be expressed as data.
///
/// # Examples
///
/// ```
/// use titlematch::EditionSuffix;
///
/// let year = EditionSuffix::new("(####)");
/// assert_eq!(year.strip_from("doom (2016)"), Some("doom"));
/// assert_eq!(year.strip_from("doom"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EditionSuffix {
    pattern: String,
}

impl EditionSuffix {
    /// Create a suffix from its normalized pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Remove this suffix from the end of `title`, if present at a word
    /// boundary.
    ///
    /// The byte before the suffix must be a space, so a title consisting
    /// solely of the suffix is left alone. Returns the remaining prefix with
    /// trailing whitespace trimmed, borrowed from `title`.
    pub fn strip_from<'t>(&self, title: &'t str) -> Option<&'t str> {
        let pattern = self.pattern.as_bytes();
        let bytes = title.as_bytes();
        if pattern.is_empty() || bytes.len() <= pattern.len() {
            return None;
        }

        let start = bytes.len() - pattern.len();
        if !title.is_char_boundary(start) || bytes[start - 1] != b' ' {
            return None;
        }

        // '#' is ASCII, so it can never collide with a UTF-8 continuation
        // byte and a byte-wise comparison is exact.
        let tail = &bytes[start..];
        let matches = pattern.iter().zip(tail).all(|(&p, &t)| {
            if p == b'#' {
                t.is_ascii_digit()
            } else {
                p == t
            }
        });

        matches.then(|| title[..start].trim_end())
    }
}

/// A roman-numeral token and the arabic value it is rewritten to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NumeralRule {
    /// Lowercase token, e.g. `"vii"`.
    pub token: String,
    /// Replacement, e.g. `"7"`.
    pub value: String,
}

impl NumeralRule {
    /// Create a rule rewriting `token` to `value`.
    pub fn new(token: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            value: value.into(),
        }
    }
}

/// Ordered edition suffixes. More specific entries come before the shorter
/// entries they end with, since only the first hit is stripped.
const DEFAULT_SUFFIXES: &[&str] = &[
    "game of the year edition",
    "goty edition",
    "digital deluxe edition",
    "deluxe edition",
    "definitive edition",
    "special edition",
    "complete edition",
    "ultimate edition",
    "enhanced edition",
    "anniversary edition",
    "collector's edition",
    "gold edition",
    "director's cut",
    "game of the year",
    "goty",
    "hd remaster",
    "remastered",
    "remaster",
    "redux",
    "(####)",
];

const DEFAULT_NUMERALS: &[(&str, &str)] = &[
    ("ii", "2"),
    ("iii", "3"),
    ("iv", "4"),
    ("v", "5"),
    ("vi", "6"),
    ("vii", "7"),
    ("viii", "8"),
    ("ix", "9"),
    ("x", "10"),
];

/// The suffix and numeral tables used by normalization and tier 3.
///
/// # Examples
///
/// ```
/// use titlematch::{EditionSuffix, MatchTables};
///
/// let tables = MatchTables::default();
/// assert!(tables.numeral("vii").is_some());
///
/// // A test table that only knows one suffix
/// let tables = MatchTables {
///     suffixes: vec![EditionSuffix::new("redux")],
///     ..Default::default()
/// };
/// assert_eq!(tables.suffixes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchTables {
    /// Trailing suffixes, scanned in order; the first hit is stripped.
    pub suffixes: Vec<EditionSuffix>,
    /// Isolated tokens rewritten during normalization.
    pub numerals: Vec<NumeralRule>,
}

impl Default for MatchTables {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES
                .iter()
                .map(|s| EditionSuffix::new(*s))
                .collect(),
            numerals: DEFAULT_NUMERALS
                .iter()
                .map(|(token, value)| NumeralRule::new(*token, *value))
                .collect(),
        }
    }
}

impl MatchTables {
    /// Tables with no suffixes and no numerals.
    pub fn empty() -> Self {
        Self {
            suffixes: Vec::new(),
            numerals: Vec::new(),
        }
    }

    /// Parse and validate tables from TOML text.
    ///
    /// Keys that are absent keep their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Parse`] for malformed TOML and any validation
    /// error from [`MatchTables::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use titlematch::MatchTables;
    ///
    /// let tables = MatchTables::from_toml_str(r#"suffixes = ["redux", "(####)"]"#).unwrap();
    /// assert_eq!(tables.suffixes.len(), 2);
    /// assert!(tables.numeral("iv").is_some());
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        let tables: MatchTables = toml::from_str(text)?;
        tables.validate()?;
        log::debug!(
            "loaded {} suffixes and {} numerals",
            tables.suffixes.len(),
            tables.numerals.len()
        );
        Ok(tables)
    }

    /// Look up the replacement for a single lowercase token.
    pub fn numeral(&self, token: &str) -> Option<&str> {
        self.numerals
            .iter()
            .find(|rule| rule.token == token)
            .map(|rule| rule.value.as_str())
    }

    /// Check that every entry can take part in matching.
    ///
    /// # Errors
    ///
    /// - [`TableError::EmptyEntry`] for an empty suffix, token, or value
    /// - [`TableError::MultiTokenNumeral`] for a token with whitespace or
    ///   uppercase letters
    /// - [`TableError::ChainedNumeral`] when a value is itself a token
    /// - [`TableError::NotNormalized`] for a suffix or numeral value that
    ///   normalizes to something else
    /// - [`TableError::Duplicate`] for repeated suffixes or tokens
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();
        for rule in &self.numerals {
            if rule.token.is_empty() {
                return Err(TableError::EmptyEntry { kind: "numeral token" });
            }
            if rule.value.is_empty() {
                return Err(TableError::EmptyEntry { kind: "numeral value" });
            }
            if rule.token.chars().any(char::is_whitespace) || rule.token != rule.token.to_lowercase()
            {
                return Err(TableError::MultiTokenNumeral {
                    token: rule.token.clone(),
                });
            }
            if !seen.insert(rule.token.as_str()) {
                return Err(TableError::Duplicate {
                    entry: rule.token.clone(),
                });
            }
        }
        let plain = MatchTables::empty();
        for rule in &self.numerals {
            let normalized = normalize_title(&rule.value, &plain, &MatchOptions::default());
            if normalized != rule.value {
                log::warn!(
                    "rejecting numeral value {:?}: normalizes to {normalized:?}",
                    rule.value
                );
                return Err(TableError::NotNormalized {
                    entry: rule.value.clone(),
                    normalized,
                });
            }
            if rule.value.split_whitespace().any(|part| self.numeral(part).is_some()) {
                return Err(TableError::ChainedNumeral {
                    value: rule.value.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for suffix in &self.suffixes {
            let pattern = suffix.pattern();
            if pattern.is_empty() {
                return Err(TableError::EmptyEntry { kind: "suffix" });
            }
            let normalized = normalize_title(pattern, self, &MatchOptions::default());
            if normalized != pattern {
                log::warn!("rejecting suffix {pattern:?}: normalizes to {normalized:?}");
                return Err(TableError::NotNormalized {
                    entry: pattern.to_owned(),
                    normalized,
                });
            }
            if !seen.insert(pattern) {
                return Err(TableError::Duplicate {
                    entry: pattern.to_owned(),
                });
            }
        }

        Ok(())
    }
}
