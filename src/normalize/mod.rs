//! Title normalization.
//!
//! Reduces a raw title to the canonical key used by the normalized,
//! edition-stripped, and compact tiers: lowercase, separator punctuation folded
//! to spaces, trademark glyphs dropped, isolated roman numerals rewritten to
//! arabic digits, whitespace collapsed.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::options::MatchOptions;
use crate::tables::MatchTables;

/// Returns whether `c` is folded into a single space.
///
/// Colon, hyphen, en dash, em dash, underscore and period.
fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '\u{2013}' | '\u{2014}' | '_' | '.')
}

/// Returns whether `c` is a trademark, registered, or copyright glyph.
fn is_mark_glyph(c: char) -> bool {
    matches!(c, '\u{2122}' | '\u{00AE}' | '\u{00A9}')
}

/// Normalize a raw title into its comparison key.
///
/// Steps, in order:
///
/// 1. Optionally fold diacritics (see [`MatchOptions::fold_diacritics`])
/// 2. Trim and lowercase
/// 3. Fold separators (`:` `-` en dash, em dash, `_` `.`) into spaces
/// 4. Drop trademark, registered and copyright glyphs without a replacement
/// 5. Rewrite each whitespace-delimited token found in the numeral table
/// 6. Collapse whitespace runs to single spaces and trim
///
/// Numerals are replaced per token, so a numeral at either edge of the title
/// is converted while letters inside a word ("hawaii") are never touched.
/// The result is idempotent for any table accepted by
/// [`MatchTables::validate`].
///
/// # Arguments
///
/// * `raw` - The title as supplied by any source
/// * `tables` - Supplies the numeral table
/// * `options` - Supplies the diacritics switch
///
/// # Examples
///
/// ```
/// use titlematch::{MatchOptions, MatchTables, normalize_title};
///
/// let tables = MatchTables::default();
/// let opts = MatchOptions::default();
/// assert_eq!(normalize_title("Final Fantasy VII", &tables, &opts), "final fantasy 7");
/// assert_eq!(
///     normalize_title("The Witcher\u{2122} 3: Wild Hunt", &tables, &opts),
///     "the witcher 3 wild hunt"
/// );
/// assert_eq!(normalize_title("", &tables, &opts), "");
/// ```
pub fn normalize_title(raw: &str, tables: &MatchTables, options: &MatchOptions) -> String {
    let source = if options.fold_diacritics {
        fold_diacritics(raw)
    } else {
        Cow::Borrowed(raw)
    };

    let mut folded = String::with_capacity(source.len());
    for c in source.trim().chars() {
        if is_separator(c) {
            folded.push(' ');
        } else if !is_mark_glyph(c) {
            folded.extend(c.to_lowercase());
        }
    }

    // Token iteration both collapses whitespace and gives every numeral an
    // implicit space on each side, including at the edges.
    let mut normalized = String::with_capacity(folded.len());
    for token in folded.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(tables.numeral(token).unwrap_or(token));
    }

    normalized
}

/// Strip diacritics by NFD decomposition and removal of combining marks.
///
/// Returns [`Cow::Borrowed`] when nothing is removed, including the ASCII fast
/// path.
///
/// # Examples
///
/// ```
/// use titlematch::normalize::fold_diacritics;
///
/// assert_eq!(fold_diacritics("Pok\u{00e9}mon"), "Pokemon");
/// assert!(matches!(fold_diacritics("Pokemon"), std::borrow::Cow::Borrowed(_)));
/// ```
pub fn fold_diacritics(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }

    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();

    if stripped == s {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(stripped)
    }
}

/// Remove every space from a normalized title.
///
/// Expects normalized input, where the only whitespace is single ASCII
/// spaces. Borrows when there is nothing to remove.
///
/// # Examples
///
/// ```
/// use titlematch::normalize::compact_title;
///
/// assert_eq!(compact_title("star fox 64"), "starfox64");
/// assert!(matches!(compact_title("starfox"), std::borrow::Cow::Borrowed(_)));
/// ```
pub fn compact_title(normalized: &str) -> Cow<'_, str> {
    if memchr::memchr(b' ', normalized.as_bytes()).is_none() {
        return Cow::Borrowed(normalized);
    }
    Cow::Owned(normalized.chars().filter(|c| *c != ' ').collect())
}

/// Lowercase `s` into `buf`, reusing the buffer's allocation.
///
/// This is the case folding of the exact tier: no trimming and no
/// punctuation handling.
pub(crate) fn lowercase_into(s: &str, buf: &mut String) {
    buf.clear();
    buf.reserve(s.len());
    if s.is_ascii() {
        buf.extend(s.as_bytes().iter().map(|&b| b.to_ascii_lowercase() as char));
    } else {
        for c in s.chars() {
            buf.extend(c.to_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_title(s, &MatchTables::default(), &MatchOptions::default())
    }

    // --- case and whitespace ---

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(norm("  HALO Infinite  "), "halo infinite");
    }

    #[test]
    fn case_combinations_agree() {
        let forms = ["Mass Effect", "MASS EFFECT", "mass effect", "mAsS eFfEcT"];
        for form in forms {
            assert_eq!(norm(form), "mass effect", "form {form}");
        }
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(norm("Half   Life\t2"), "half life 2");
    }

    #[test]
    fn empty_and_blank() {
        assert_eq!(norm(""), "");
        assert_eq!(norm("   "), "");
        assert_eq!(norm(":-_."), "");
    }

    // --- punctuation and glyphs ---

    #[test]
    fn colon_and_hyphen_equivalent() {
        assert_eq!(norm("Halo: Reach"), norm("Halo - Reach"));
        assert_eq!(norm("Halo: Reach"), "halo reach");
    }

    #[test]
    fn dash_variants_fold() {
        assert_eq!(norm("Spider\u{2013}Man"), "spider man");
        assert_eq!(norm("Spider\u{2014}Man"), "spider man");
        assert_eq!(norm("Spider-Man"), "spider man");
    }

    #[test]
    fn underscore_and_period_fold() {
        assert_eq!(norm("super_mario_bros."), "super mario bros");
        assert_eq!(norm("S.T.A.L.K.E.R."), "s t a l k e r");
    }

    #[test]
    fn glyphs_removed_without_space() {
        assert_eq!(norm("Tetris\u{00AE} Effect"), "tetris effect");
        assert_eq!(norm("Portal\u{2122}2"), "portal2");
        assert_eq!(norm("\u{00A9}Ubisoft"), "ubisoft");
    }

    #[test]
    fn apostrophes_are_kept() {
        assert_eq!(norm("Assassin's Creed"), "assassin's creed");
        assert_ne!(norm("Assassin's Creed"), norm("Assassins Creed"));
    }

    // --- roman numerals ---

    #[test]
    fn numeral_at_end() {
        assert_eq!(norm("Final Fantasy VII"), norm("Final Fantasy 7"));
        assert_eq!(norm("Final Fantasy VII"), "final fantasy 7");
    }

    #[test]
    fn numeral_mid_string() {
        assert_eq!(norm("Civilization VI: Gathering Storm"), "civilization 6 gathering storm");
    }

    #[test]
    fn numeral_at_start() {
        assert_eq!(norm("II Dynasty"), "2 dynasty");
    }

    #[test]
    fn numeral_after_separator() {
        assert_eq!(norm("Rocky-IV"), "rocky 4");
    }

    #[test]
    fn every_default_numeral() {
        let cases = [
            ("Game II", "game 2"),
            ("Game III", "game 3"),
            ("Game IV", "game 4"),
            ("Game V", "game 5"),
            ("Game VI", "game 6"),
            ("Game VII", "game 7"),
            ("Game VIII", "game 8"),
            ("Game IX", "game 9"),
            ("Game X", "game 10"),
        ];
        for (raw, expected) in cases {
            assert_eq!(norm(raw), expected, "raw {raw}");
        }
    }

    #[test]
    fn numeral_letters_inside_words_untouched() {
        assert_eq!(norm("Hawaii Vice"), "hawaii vice");
        assert_eq!(norm("Civic Vixen"), "civic vixen");
        assert_eq!(norm("Xiii"), "xiii");
    }

    #[test]
    fn numeral_one_not_converted() {
        assert_eq!(norm("Rocky I"), "rocky i");
    }

    #[test]
    fn adjacent_numerals_all_converted() {
        assert_eq!(norm("ii ii ii"), "2 2 2");
    }

    #[test]
    fn alternate_numeral_table() {
        let tables = MatchTables {
            numerals: vec![crate::tables::NumeralRule::new("zwei", "2")],
            ..Default::default()
        };
        let opts = MatchOptions::default();
        assert_eq!(normalize_title("Teil Zwei", &tables, &opts), "teil 2");
        assert_eq!(normalize_title("Teil II", &tables, &opts), "teil ii");
    }

    // --- idempotence ---

    #[test]
    fn idempotent() {
        let titles = [
            "The Witcher\u{2122} 3: Wild Hunt",
            "FINAL FANTASY VII REMAKE",
            "ii ii ii",
            "  Star Wars: Episode I \u{2014} Racer ",
            "Tom Clancy's Rainbow Six\u{00AE} Siege",
            "",
        ];
        for title in titles {
            let once = norm(title);
            assert_eq!(norm(&once), once, "title {title:?}");
        }
    }

    // --- diacritics ---

    #[test]
    fn diacritics_kept_by_default() {
        assert_eq!(norm("Pok\u{00e9}mon"), "pok\u{00e9}mon");
    }

    #[test]
    fn diacritics_folded_when_enabled() {
        let opts = MatchOptions {
            fold_diacritics: true,
            ..Default::default()
        };
        let tables = MatchTables::default();
        assert_eq!(normalize_title("Pok\u{00e9}mon", &tables, &opts), "pokemon");
        assert_eq!(normalize_title("O\u{0308}KO", &tables, &opts), "oko");
    }

    #[test]
    fn fold_diacritics_borrows_when_unchanged() {
        assert!(matches!(fold_diacritics("plain"), Cow::Borrowed(_)));
        assert!(matches!(fold_diacritics("\u{4e16}\u{754c}"), Cow::Borrowed(_)));
        assert!(matches!(fold_diacritics("caf\u{00e9}"), Cow::Owned(_)));
    }

    // --- compact_title ---

    #[test]
    fn compact_removes_spaces() {
        assert_eq!(compact_title("street fighter 2"), "streetfighter2");
        assert!(matches!(compact_title("street fighter 2"), Cow::Owned(_)));
    }

    #[test]
    fn compact_borrows_without_spaces() {
        assert!(matches!(compact_title("doom"), Cow::Borrowed(_)));
        assert!(matches!(compact_title(""), Cow::Borrowed(_)));
    }

    // --- lowercase_into ---

    #[test]
    fn lowercase_into_reuses_buffer() {
        let mut buf = String::from("leftover");
        lowercase_into("DOOM", &mut buf);
        assert_eq!(buf, "doom");
        lowercase_into("\u{00C9}T\u{00C9}", &mut buf);
        assert_eq!(buf, "\u{00e9}t\u{00e9}");
    }

    #[test]
    fn lowercase_into_keeps_punctuation() {
        let mut buf = String::new();
        lowercase_into(" Halo: Reach ", &mut buf);
        assert_eq!(buf, " halo: reach ");
    }
}
