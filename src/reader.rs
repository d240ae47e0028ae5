//! Reader position and its transitions.
//!
//! The reader never mutates its own position. Every transition produces the
//! next [`Position`]; the caller rewrites the fragment and the router renders
//! the new position from scratch.

use crate::catalog::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub chapter: usize,
    pub page: usize,
}

impl Position {
    pub const fn new(chapter: usize, page: usize) -> Self {
        Self { chapter, page }
    }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, shift: bool) -> Self {
        Self {
            key: key.into(),
            shift,
        }
    }

    /// Parses `ArrowRight`, `Shift+ArrowLeft`, `+`, `-` and friends.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("Shift+") {
            Some(key) if !key.is_empty() => Self::new(key, true),
            _ => Self::new(raw, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    Goto(Position),
    Widen,
    Narrow,
}

/// Navigation over one series, expressed purely in page counts so that it can
/// outlive the borrowed catalog inside a key handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    page_counts: Vec<usize>,
    at: Position,
}

impl Navigator {
    /// Clamps the requested indices into the series. `None` when the series
    /// has no chapters or the selected chapter has no pages.
    pub fn clamp(series: &Series, chapter: i64, page: i64) -> Option<Self> {
        Self::clamp_counts(series.page_counts(), chapter, page)
    }

    pub fn clamp_counts(page_counts: Vec<usize>, chapter: i64, page: i64) -> Option<Self> {
        let chapter = clamp_index(chapter, page_counts.len())?;
        let page = clamp_index(page, page_counts[chapter])?;
        Some(Self {
            page_counts,
            at: Position { chapter, page },
        })
    }

    pub fn position(&self) -> Position {
        self.at
    }

    fn last_page_of(&self, chapter: usize) -> usize {
        self.page_counts[chapter].saturating_sub(1)
    }

    fn last_chapter(&self) -> usize {
        self.page_counts.len().saturating_sub(1)
    }

    pub fn prev_page(&self) -> Option<Position> {
        let Position { chapter, page } = self.at;
        if page > 0 {
            Some(Position::new(chapter, page - 1))
        } else if chapter > 0 {
            Some(Position::new(chapter - 1, self.last_page_of(chapter - 1)))
        } else {
            None
        }
    }

    pub fn next_page(&self) -> Option<Position> {
        let Position { chapter, page } = self.at;
        if page < self.last_page_of(chapter) {
            Some(Position::new(chapter, page + 1))
        } else if chapter < self.last_chapter() {
            Some(Position::new(chapter + 1, 0))
        } else {
            None
        }
    }

    pub fn prev_chapter(&self) -> Option<Position> {
        let chapter = self.at.chapter.checked_sub(1)?;
        Some(Position::new(chapter, 0))
    }

    pub fn next_chapter(&self) -> Option<Position> {
        (self.at.chapter < self.last_chapter()).then(|| Position::new(self.at.chapter + 1, 0))
    }

    /// Key binding table for the reader view.
    pub fn command(&self, input: &KeyInput) -> Option<ReaderCommand> {
        match input.key.as_str() {
            "ArrowLeft" if input.shift => self.prev_chapter().map(ReaderCommand::Goto),
            "ArrowLeft" => self.prev_page().map(ReaderCommand::Goto),
            "ArrowRight" if input.shift => self.next_chapter().map(ReaderCommand::Goto),
            "ArrowRight" => self.next_page().map(ReaderCommand::Goto),
            "+" => Some(ReaderCommand::Widen),
            // U+2212 MINUS SIGN, produced by some layouts.
            "-" | "\u{2212}" => Some(ReaderCommand::Narrow),
            _ => None,
        }
    }
}

/// The image worth preloading after rendering `at`: the next page of the same
/// chapter, if any.
pub fn preload_target(series: &Series, at: Position) -> Option<&str> {
    series
        .chapters
        .get(at.chapter)?
        .pages
        .get(at.page + 1)
        .map(String::as_str)
}

fn clamp_index(requested: i64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    Some(usize::try_from(requested).map_or(0, |index| index.min(last)))
}
