//! Document, paginator and assembler bundled into one explicitly owned engine.

use log::{info, warn};

use crate::{
    assembler::{AssemblyState, ChunkAssembler, ChunkOutcome, DEFAULT_MAX_DOCUMENT_BYTES, Fragment},
    document::{Document, DocumentStore, ResourceLoader},
    error::ReaderError,
    paginator::{BoundaryPolicy, PageSizePolicy, PageSlice, Paginator, ReadingCursor},
    render::{FontSize, Theme},
};

/// Shown instead of a page when the document is empty.
pub const NO_CONTENT_TEXT: &str =
    "No text loaded. Open configuration on the phone and send a .txt file.";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub policy: PageSizePolicy,
    pub boundary: BoundaryPolicy,
    pub max_document_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            policy: PageSizePolicy::default(),
            boundary: BoundaryPolicy::HardCut,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

/// What a fragment did to the engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FragmentEffect {
    /// A new document replaced the active one and the page was reset to 0.
    pub finalized: bool,
    pub notice: Option<ReaderError>,
}

#[derive(Debug)]
pub struct ReaderEngine {
    store: DocumentStore,
    paginator: Paginator,
    assembler: ChunkAssembler,
}

impl ReaderEngine {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            store: DocumentStore::new(),
            paginator: Paginator::new(config.policy, config.boundary),
            assembler: ChunkAssembler::new(config.max_document_bytes),
        }
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn revision(&self) -> u32 {
        self.store.revision()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn cursor(&self) -> ReadingCursor {
        self.paginator.cursor()
    }

    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages()
    }

    pub fn assembly_state(&self) -> AssemblyState {
        self.assembler.state()
    }

    pub fn restore_cursor(&mut self, cursor: ReadingCursor) {
        self.paginator.restore(cursor);
    }

    /// Swaps in `document`, recomputes the page count and returns the old document.
    pub fn replace_document(&mut self, document: Document) -> Document {
        let previous = self.store.replace(document);
        self.paginator.set_document_len(self.store.document().len());
        previous
    }

    /// Loads a bundled resource; on failure the empty document is installed.
    pub fn load_resource<L: ResourceLoader>(
        &mut self,
        loader: &L,
        id: u32,
    ) -> Result<(), ReaderError> {
        let result = self.store.load_resource(loader, id).map(|_| ());
        if let Err(err) = result {
            warn!("reader: resource id={} unavailable err={:?}", id, err);
            self.store.clear();
        }
        self.paginator.set_document_len(self.store.document().len());
        result
    }

    pub fn set_font_index(&mut self, index: u8) -> Result<(), ReaderError> {
        self.paginator.set_font_index(index)
    }

    pub fn set_font(&mut self, font: FontSize) -> bool {
        self.paginator.set_font(font)
    }

    pub fn cycle_font(&mut self) -> FontSize {
        self.paginator.cycle_font()
    }

    pub fn increase_font(&mut self) -> bool {
        self.paginator.increase_font()
    }

    pub fn decrease_font(&mut self) -> bool {
        self.paginator.decrease_font()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.paginator.set_theme(theme);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.paginator.toggle_theme()
    }

    pub fn next_page(&mut self) -> bool {
        self.paginator.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.paginator.prev_page()
    }

    pub fn jump_to_start(&mut self) -> bool {
        self.paginator.jump_to_start()
    }

    pub fn current_slice(&self) -> PageSlice<'_> {
        self.paginator.current_slice(self.store.document())
    }

    /// Text for the renderer: the current page, or [`NO_CONTENT_TEXT`].
    pub fn current_text(&self) -> &str {
        if self.store.document().is_empty() {
            return NO_CONTENT_TEXT;
        }
        self.current_slice().text()
    }

    /// Feeds one fragment. A finished transfer replaces the document and rewinds to page 0.
    /// On error the active document is untouched.
    pub fn accept_fragment(&mut self, fragment: &Fragment) -> Result<FragmentEffect, ReaderError> {
        let outcome = self.assembler.push(fragment)?;
        let notice = outcome.notice();

        if let ChunkOutcome::Finalized { document, .. } = outcome {
            info!(
                "reader: delivered document installed bytes={}",
                document.len()
            );
            self.replace_document(document);
            self.paginator.jump_to_start();
            return Ok(FragmentEffect {
                finalized: true,
                notice,
            });
        }

        Ok(FragmentEffect {
            finalized: false,
            notice,
        })
    }
}

impl Default for ReaderEngine {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StaticResources;

    fn engine_with_budget(budget: usize) -> ReaderEngine {
        ReaderEngine::new(ReaderConfig {
            policy: PageSizePolicy::uniform(budget).unwrap(),
            ..ReaderConfig::default()
        })
    }

    #[test]
    fn empty_engine_shows_placeholder_on_single_page() {
        let engine = ReaderEngine::default();
        assert_eq!(engine.total_pages(), 1);
        assert_eq!(engine.current_text(), NO_CONTENT_TEXT);
    }

    #[test]
    fn missing_resource_degrades_to_empty_document() {
        let mut engine = engine_with_budget(4);
        engine.replace_document(Document::from_bytes(&b"some old text"[..]));
        engine.next_page();

        let resources = StaticResources::new();
        assert_eq!(
            engine.load_resource(&resources, 9),
            Err(ReaderError::ResourceUnavailable)
        );
        assert!(engine.document().is_empty());
        assert_eq!(engine.cursor().page, 0);
        assert_eq!(engine.current_text(), NO_CONTENT_TEXT);
    }

    #[test]
    fn finalized_transfer_resets_page_and_shows_first_budget() {
        let mut engine = engine_with_budget(3);
        engine.replace_document(Document::from_bytes(&b"0123456789"[..]));
        engine.next_page();
        engine.next_page();
        assert_eq!(engine.cursor().page, 2);

        engine.accept_fragment(&Fragment::new(0, "AB")).unwrap();
        assert_eq!(engine.document().as_bytes(), b"0123456789");

        let effect = engine.accept_fragment(&Fragment::new(1, "CDEF")).unwrap();
        assert!(!effect.finalized);

        let effect = engine.accept_fragment(&Fragment::finished_marker()).unwrap();
        assert!(effect.finalized);
        assert_eq!(engine.cursor().page, 0);
        assert_eq!(engine.total_pages(), 2);
        assert_eq!(engine.current_text(), "ABC");
    }

    #[test]
    fn failed_transfer_keeps_previous_document() {
        let mut engine = ReaderEngine::new(ReaderConfig {
            max_document_bytes: 4,
            ..ReaderConfig::default()
        });
        engine.replace_document(Document::from_bytes(&b"kept"[..]));

        engine.accept_fragment(&Fragment::new(0, "abc")).unwrap();
        assert_eq!(
            engine.accept_fragment(&Fragment::new(1, "def")),
            Err(ReaderError::AllocationFailure)
        );
        assert_eq!(engine.document().as_bytes(), b"kept");
    }

    #[test]
    fn recovered_start_is_reported_as_notice() {
        let mut engine = ReaderEngine::default();
        let effect = engine.accept_fragment(&Fragment::last(5, "tail")).unwrap();
        assert!(effect.finalized);
        assert_eq!(effect.notice, Some(ReaderError::OutOfRangeChunk));
        assert_eq!(engine.current_text(), "tail");
    }

    #[test]
    fn replace_revision_tracks_document_changes() {
        let mut engine = ReaderEngine::default();
        let before = engine.revision();
        engine.replace_document(Document::from_bytes(&b"x"[..]));
        assert_eq!(engine.revision(), before.wrapping_add(1));
    }
}
