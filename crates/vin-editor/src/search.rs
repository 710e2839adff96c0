//! Search: literal byte-string matching with a cyclic match cache.
//!
//! Forward (`/`) and backward (`?`) search share one engine. Every change to
//! the query rebuilds a [`MatchCache`] from scratch: each row is scanned from
//! the start and its first occurrence, if any, is recorded, so the cache holds
//! at most one match per row, in document order. `n` and `N` then cycle through the cache, wrapping at both ends.
//!
//! The direction only decides which way "next" goes. A backward search walks
//! the same cache in reverse.
//!
//! # Search flow
//!
//! 1. `/` or `?` opens the prompt; the controller saves cursor and scroll
//! 2. Each keystroke rebuilds the cache and jumps to the current match
//! 3. Enter keeps the cursor where it is and the cache alive for `n`/`N`
//! 4. Escape (or Enter on an empty query) restores the saved position and
//!    drops the cache

use crate::buffer::Document;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// `Forward` if `forward`, else `Backward`.
    #[must_use]
    pub const fn from_forward(forward: bool) -> Self {
        if forward { Self::Forward } else { Self::Backward }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The prompt prefix: `/` or `?`.
    #[must_use]
    pub const fn prompt_char(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One occurrence of the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Raw column of the first matched byte.
    pub col: usize,
    /// Row of the match.
    pub row: usize,
    /// Scroll offset to restore when jumping here: the match row itself, so
    /// the match lands at the top of the screen.
    pub row_offset: usize,
}

impl Match {
    const fn new(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            row_offset: row,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchCache
// ---------------------------------------------------------------------------

/// All matches of one query, plus a cyclic current index.
///
/// Never empty: [`build`](Self::build) returns `None` instead of an empty
/// cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchCache {
    matches: Vec<Match>,
    index: usize,
    direction: SearchDirection,
}

impl MatchCache {
    /// Scan `doc` for `query`.
    ///
    /// The current index starts at the first match on or after `from_row`,
    /// or at the first match if every match lies above it. Returns `None`
    /// for an empty query or when nothing matches.
    #[must_use]
    pub fn build(
        doc: &Document,
        query: &[u8],
        direction: SearchDirection,
        from_row: usize,
    ) -> Option<Self> {
        if query.is_empty() {
            return None;
        }

        let matches: Vec<Match> = doc
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(row, r)| find_in(r.chars(), query).map(|col| Match::new(col, row)))
            .collect();

        if matches.is_empty() {
            return None;
        }

        let index = matches.iter().position(|m| m.row >= from_row).unwrap_or(0);
        Some(Self {
            matches,
            index,
            direction,
        })
    }

    /// Number of matches (always ≥ 1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// All matches in document order.
    #[inline]
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Index of the current match.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The direction `next` walks in.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// The current match.
    #[must_use]
    pub fn current(&self) -> Match {
        self.matches[self.index]
    }

    /// Step in the search direction, wrapping, and return the new match.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Match {
        self.step(self.direction)
    }

    /// Step against the search direction, wrapping, and return the new match.
    pub fn previous(&mut self) -> Match {
        self.step(self.direction.opposite())
    }

    fn step(&mut self, direction: SearchDirection) -> Match {
        let len = self.matches.len();
        self.index = match direction {
            SearchDirection::Forward => (self.index + 1) % len,
            SearchDirection::Backward => (self.index + len - 1) % len,
        };
        self.current()
    }
}

/// Start column of the first occurrence of `needle`. `needle` is non-empty.
fn find_in(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().map(|l| l.as_bytes()), 2)
    }

    fn positions(cache: &MatchCache) -> Vec<(usize, usize)> {
        cache.matches().iter().map(|m| (m.col, m.row)).collect()
    }

    // -- Direction ----------------------------------------------------------

    #[test]
    fn direction_helpers() {
        assert_eq!(SearchDirection::from_forward(true), SearchDirection::Forward);
        assert_eq!(SearchDirection::from_forward(false), SearchDirection::Backward);
        assert_eq!(SearchDirection::Forward.opposite(), SearchDirection::Backward);
        assert_eq!(SearchDirection::Forward.prompt_char(), '/');
        assert_eq!(SearchDirection::Backward.prompt_char(), '?');
    }

    // -- find_in ------------------------------------------------------------

    #[test]
    fn find_in_first_occurrence() {
        assert_eq!(find_in(b"aaaa", b"aa"), Some(0));
        assert_eq!(find_in(b"abcabc", b"bc"), Some(1));
        assert_eq!(find_in(b"ab", b"abc"), None);
        assert_eq!(find_in(b"", b"a"), None);
    }

    // -- Building -----------------------------------------------------------

    #[test]
    fn foo_scenario() {
        let d = doc(&["xfoo", "foobar", "nomatch"]);
        let mut cache = MatchCache::build(&d, b"foo", SearchDirection::Forward, 0).unwrap();
        assert_eq!(positions(&cache), [(1, 0), (0, 1)]);
        assert_eq!(cache.index(), 0);

        let m = cache.next();
        assert_eq!((m.col, m.row), (0, 1));
        let m = cache.next();
        assert_eq!((m.col, m.row), (1, 0));
    }

    #[test]
    fn first_occurrence_per_row_in_document_order() {
        let d = doc(&["a.a", "", "..a"]);
        let mut cache = MatchCache::build(&d, b"a", SearchDirection::Forward, 0).unwrap();
        assert_eq!(positions(&cache), [(0, 0), (2, 2)]);
        assert_eq!(cache.next().row, 2);
        assert_eq!(cache.next().row, 0);
    }

    #[test]
    fn match_row_offset_is_its_row() {
        let d = doc(&["", "", "hit"]);
        let cache = MatchCache::build(&d, b"hit", SearchDirection::Forward, 0).unwrap();
        assert_eq!(cache.current(), Match { col: 0, row: 2, row_offset: 2 });
    }

    #[test]
    fn empty_query_or_no_hit_builds_nothing() {
        let d = doc(&["abc"]);
        assert!(MatchCache::build(&d, b"", SearchDirection::Forward, 0).is_none());
        assert!(MatchCache::build(&d, b"zzz", SearchDirection::Forward, 0).is_none());
        assert!(MatchCache::build(&doc(&[]), b"a", SearchDirection::Forward, 0).is_none());
    }

    #[test]
    fn tabs_are_matched_raw() {
        let d = doc(&["a\tb"]);
        let cache = MatchCache::build(&d, b"\tb", SearchDirection::Forward, 0).unwrap();
        assert_eq!(cache.current().col, 1);
        assert!(MatchCache::build(&d, b"  b", SearchDirection::Forward, 0).is_none());
    }

    // -- Initial index ------------------------------------------------------

    #[test]
    fn starts_at_first_match_on_or_after_saved_row() {
        let d = doc(&["x", "y", "x", "y", "x"]);
        let cache = MatchCache::build(&d, b"x", SearchDirection::Forward, 1).unwrap();
        assert_eq!(cache.current().row, 2);
        let cache = MatchCache::build(&d, b"x", SearchDirection::Backward, 2).unwrap();
        assert_eq!(cache.current().row, 2);
    }

    #[test]
    fn wraps_to_first_when_all_matches_are_above() {
        let d = doc(&["x", "y", "y"]);
        let cache = MatchCache::build(&d, b"x", SearchDirection::Forward, 2).unwrap();
        assert_eq!(cache.index(), 0);
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn backward_next_walks_in_reverse() {
        let d = doc(&["q", "q", "q"]);
        let mut cache = MatchCache::build(&d, b"q", SearchDirection::Backward, 0).unwrap();
        assert_eq!(cache.next().row, 2);
        assert_eq!(cache.next().row, 1);
        assert_eq!(cache.previous().row, 2);
    }

    #[test]
    fn next_and_previous_cycle_closure() {
        let d = doc(&["ab ab", "", "b", "abab"]);
        for direction in [SearchDirection::Forward, SearchDirection::Backward] {
            let base = MatchCache::build(&d, b"b", direction, 0).unwrap();
            let m = base.len();
            for start in 0..m {
                let mut cache = base.clone();
                cache.index = start;

                for _ in 0..m {
                    cache.next();
                }
                assert_eq!(cache.index(), start);

                for _ in 0..m {
                    cache.previous();
                }
                assert_eq!(cache.index(), start);
            }
        }
    }

    #[test]
    fn single_match_cycles_onto_itself() {
        let d = doc(&["only"]);
        let mut cache = MatchCache::build(&d, b"only", SearchDirection::Forward, 0).unwrap();
        assert_eq!(cache.next(), cache.current());
        assert_eq!(cache.previous().col, 0);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }
}
