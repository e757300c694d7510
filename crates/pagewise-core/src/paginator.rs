//! Page arithmetic over a flat byte buffer.
//!
//! Pages are budget-aligned: page `p` always starts at `p * budget`. The budget
//! depends on the selected [`FontSize`] through a [`PageSizePolicy`].

use log::debug;

use crate::{
    document::Document,
    error::ReaderError,
    render::{FontSize, Theme},
    text_utils::{displayable_prefix, extend_to_word_end},
};

pub const DEFAULT_BUDGETS: [usize; 3] = [360, 220, 140];

/// Per-font character budget. Every budget is non-zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSizePolicy {
    budgets: [usize; 3],
}

impl PageSizePolicy {
    /// `budgets` is indexed by [`FontSize::index`]. Returns `None` if any entry is zero.
    pub const fn new(budgets: [usize; 3]) -> Option<Self> {
        if budgets[0] == 0 || budgets[1] == 0 || budgets[2] == 0 {
            return None;
        }
        Some(Self { budgets })
    }

    /// Same budget for every font size.
    pub const fn uniform(budget: usize) -> Option<Self> {
        Self::new([budget; 3])
    }

    pub const fn budget(&self, font: FontSize) -> usize {
        self.budgets[font.index() as usize]
    }
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        Self {
            budgets: DEFAULT_BUDGETS,
        }
    }
}

/// Where a page ends relative to the raw budget cut.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BoundaryPolicy {
    /// Exactly `budget` bytes, possibly splitting a word.
    #[default]
    HardCut,
    /// Push the end forward to finish a word cut in half, stopping at the document end.
    WordBoundaryExtend,
}

/// What the reader is looking at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadingCursor {
    pub page: usize,
    pub font: FontSize,
    pub theme: Theme,
}

/// Borrowed view of one page. Tied to the document it was cut from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageSlice<'a> {
    pub start: usize,
    pub bytes: &'a [u8],
}

impl<'a> PageSlice<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    /// Page text with partial UTF-8 sequences at either edge dropped.
    pub fn text(&self) -> &'a str {
        displayable_prefix(self.bytes)
    }
}

/// `ceil(len / budget)`, with the empty document still occupying one page.
pub const fn compute_total_pages(document_len: usize, budget: usize) -> usize {
    if document_len == 0 || budget == 0 {
        return 1;
    }
    document_len.div_ceil(budget)
}

#[derive(Clone, Debug)]
pub struct Paginator {
    policy: PageSizePolicy,
    boundary: BoundaryPolicy,
    cursor: ReadingCursor,
    document_len: usize,
    total_pages: usize,
}

impl Paginator {
    pub fn new(policy: PageSizePolicy, boundary: BoundaryPolicy) -> Self {
        Self {
            policy,
            boundary,
            cursor: ReadingCursor::default(),
            document_len: 0,
            total_pages: 1,
        }
    }

    pub fn cursor(&self) -> ReadingCursor {
        self.cursor
    }

    pub fn policy(&self) -> PageSizePolicy {
        self.policy
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    pub fn set_boundary(&mut self, boundary: BoundaryPolicy) {
        self.boundary = boundary;
    }

    pub fn budget(&self) -> usize {
        self.policy.budget(self.cursor.font)
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.cursor.page
    }

    pub fn theme(&self) -> Theme {
        self.cursor.theme
    }

    /// Restores a persisted cursor. The page is clamped against the current document.
    pub fn restore(&mut self, cursor: ReadingCursor) {
        self.cursor = cursor;
        self.recompute();
    }

    /// Entry point after the document changed.
    pub fn set_document_len(&mut self, document_len: usize) {
        self.document_len = document_len;
        self.recompute();
    }

    pub fn set_font_index(&mut self, index: u8) -> Result<(), ReaderError> {
        let font = FontSize::from_index(index)?;
        self.set_font(font);
        Ok(())
    }

    /// Returns `true` when the font actually changed.
    pub fn set_font(&mut self, font: FontSize) -> bool {
        if self.cursor.font == font {
            return false;
        }
        self.cursor.font = font;
        self.recompute();
        true
    }

    pub fn cycle_font(&mut self) -> FontSize {
        self.set_font(self.cursor.font.cycled());
        self.cursor.font
    }

    pub fn increase_font(&mut self) -> bool {
        self.set_font(self.cursor.font.larger())
    }

    pub fn decrease_font(&mut self) -> bool {
        self.set_font(self.cursor.font.smaller())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.cursor.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.cursor.theme = self.cursor.theme.toggled();
        self.cursor.theme
    }

    /// Returns `true` when the page moved.
    pub fn next_page(&mut self) -> bool {
        if self.cursor.page + 1 >= self.total_pages {
            return false;
        }
        self.cursor.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.cursor.page == 0 {
            return false;
        }
        self.cursor.page -= 1;
        true
    }

    pub fn jump_to_start(&mut self) -> bool {
        let moved = self.cursor.page != 0;
        self.cursor.page = 0;
        moved
    }

    /// Byte range of the current page within `document`.
    pub fn current_slice<'d>(&self, document: &'d Document) -> PageSlice<'d> {
        self.slice_at(document, self.cursor.page)
    }

    pub fn slice_at<'d>(&self, document: &'d Document, page: usize) -> PageSlice<'d> {
        let bytes = document.as_bytes();
        let budget = self.budget();
        let start = page.saturating_mul(budget).min(bytes.len());
        let mut end = start.saturating_add(budget).min(bytes.len());

        if self.boundary == BoundaryPolicy::WordBoundaryExtend {
            end = extend_to_word_end(bytes, start, end);
        }

        PageSlice {
            start,
            bytes: &bytes[start..end],
        }
    }

    fn recompute(&mut self) {
        let total = compute_total_pages(self.document_len, self.budget());
        let page = self.cursor.page.min(total - 1);
        if page != self.cursor.page || total != self.total_pages {
            debug!(
                "pager: recompute len={} budget={} total_pages={} page={}->{}",
                self.document_len,
                self.budget(),
                total,
                self.cursor.page,
                page
            );
        }
        self.total_pages = total;
        self.cursor.page = page;
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSizePolicy::default(), BoundaryPolicy::default())
    }
}
